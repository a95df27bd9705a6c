use routegen::{
    cancel::CancelToken,
    pipeline::Pipeline,
    serializer::{build_report, serialize_json, serialize_text, serialize_yaml},
};
use tempfile::TempDir;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

#[test]
fn test_end_to_end_compilation() {
    // Create a temporary project with well-formed declarations
    let code = include_str!("fixtures/endpoints_project.rs");
    let temp_dir = create_test_project(vec![("src/users.rs", code)]);

    // Step 1: Run the whole pipeline
    let pipeline = Pipeline::new();
    let output = pipeline
        .run(temp_dir.path(), &CancelToken::new())
        .expect("Pipeline should succeed");

    assert_eq!(output.stats.files_scanned, 1);
    assert!(!output.stats.run_reused);

    // Step 2: Verify the resolved routes, in declaration order
    let endpoints = &output.resolved.endpoints;
    assert_eq!(endpoints.len(), 4, "Should resolve four endpoints");

    let symbols: Vec<&str> = endpoints.iter().map(|e| e.symbol.as_str()).collect();
    assert_eq!(
        symbols,
        vec!["Get_Users_0", "Post_Users_1", "Get_Users_2", "Get_Health_3"]
    );

    let patterns: Vec<&str> = endpoints
        .iter()
        .map(|e| e.effective_pattern.as_str())
        .collect();
    assert_eq!(
        patterns,
        vec![
            "/api/v1/users",
            "/api/v1/users",
            "/api/v1/users/{id}",
            "/api/health"
        ]
    );

    // Step 3: Verify name and tag precedence
    let list = &endpoints[0];
    assert_eq!(list.display_name, "Users", "Group name applies when no explicit name");
    assert_eq!(list.tag.as_deref(), Some("Users"));

    let create = &endpoints[1];
    assert_eq!(create.display_name, "Create user", "Explicit name wins over group name");
    assert_eq!(create.validator.as_deref(), Some("CreateUserValidator"));
    assert!(create.validate, "Associated validator should be wired");

    let health = &endpoints[3];
    assert_eq!(health.display_name, "Get_Health_3", "Symbol applies when nothing else does");
    assert_eq!(health.tag.as_deref(), Some("Health"), "Tag derives from the pattern");
    assert!(!health.validate);

    // Step 4: Verify the group resolved
    assert_eq!(output.resolved.groups.len(), 1);
    let group = &output.resolved.groups[0];
    assert_eq!(group.type_name, "UsersGroup");
    assert_eq!(group.pattern, "/api/v1/users");

    // Step 5: A clean project produces no diagnostics
    assert!(
        output.resolved.diagnostics.is_empty(),
        "Clean project should have no diagnostics, found: {:?}",
        output.resolved.diagnostics
    );

    // Step 6: Verify the generated procedures
    let generated = &output.generated;
    assert!(generated
        .registration
        .contains("registry.register::<CreateUserRequest, CreateUserValidator>();"));

    assert!(generated.mapping.contains(".mount(\"/api/v1/users\")"));
    assert!(generated.mapping.contains(".get(\"/{id}\")"));
    assert!(generated.mapping.contains(".bind_path(\"id\")"));
    assert!(generated.mapping.contains(".handle(HealthEndpoint::handle)"));
    assert!(generated.mapping.contains(".validate::<CreateUserRequest>()"));
    assert!(generated
        .mapping
        .contains("router.route(CreateUserEndpoint::configure(route))"));

    let combined = generated.combined();
    assert!(combined.starts_with("// @generated by routegen."));
}

#[test]
fn test_diagnostics_for_conflicted_project() {
    let code = include_str!("fixtures/conflicted_project.rs");
    let temp_dir = create_test_project(vec![("src/orders.rs", code)]);

    let pipeline = Pipeline::new();
    let output = pipeline
        .run(temp_dir.path(), &CancelToken::new())
        .expect("Diagnostics are data, not failures");

    // Only the conflict-free endpoint survives
    let endpoints = &output.resolved.endpoints;
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].type_name, "ListOrdersEndpoint");
    assert_eq!(endpoints[0].symbol, "Get_Orders_0");
    assert_eq!(endpoints[0].effective_pattern, "/api/v1/orders");

    // Diagnostics come out ordered by source position
    let diagnostics = &output.resolved.diagnostics;
    assert_eq!(diagnostics.error_count(), 3);
    assert_eq!(diagnostics.warning_count(), 2);

    let ids: Vec<&str> = diagnostics.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "unused-group",
            "multiple-verbs-configured",
            "multiple-verbs-configured",
            "no-verb-configured",
            "legacy-validator-base",
        ]
    );

    let args: Vec<&str> = diagnostics
        .iter()
        .map(|d| d.args[0].as_str())
        .collect();
    assert_eq!(
        args,
        vec![
            "AbandonedGroup",
            "get",
            "post",
            "SilentEndpoint",
            "OrderDraftValidator",
        ]
    );

    // Conflicted endpoints never reach the generated procedures
    assert!(!output.generated.mapping.contains("BrokenEndpoint"));
    assert!(!output.generated.mapping.contains("SilentEndpoint"));
    assert!(
        output.generated.registration.contains("let _ = registry;"),
        "No surviving endpoint carries a validator"
    );
}

#[test]
fn test_group_resolution_across_files() {
    let groups_code = r#"
        pub struct BillingGroup;

        impl EndpointGroup for BillingGroup {
            fn configure(group: GroupBuilder) -> GroupBuilder {
                group.mount("/api/v2/billing").tagged("Billing")
            }
        }
    "#;
    let handlers_code = r#"
        pub struct ListInvoicesEndpoint;

        impl Endpoint for ListInvoicesEndpoint {
            fn configure(route: RouteBuilder) -> RouteBuilder {
                route.get("/invoices").in_group::<crate::groups::BillingGroup>()
            }
        }
    "#;
    let temp_dir = create_test_project(vec![
        ("src/groups.rs", groups_code),
        ("src/handlers/invoices.rs", handlers_code),
    ]);

    let output = Pipeline::new()
        .run(temp_dir.path(), &CancelToken::new())
        .expect("Pipeline should succeed");

    // Group references match on the terminal path segment
    let endpoint = &output.resolved.endpoints[0];
    assert_eq!(endpoint.group.as_deref(), Some("BillingGroup"));
    assert_eq!(endpoint.effective_pattern, "/api/v2/billing/invoices");
    assert_eq!(endpoint.tag.as_deref(), Some("Billing"));
    assert_eq!(endpoint.symbol, "Get_BillingInvoices_0");

    assert!(output.resolved.diagnostics.is_empty());
}

#[test]
fn test_report_serialization_formats() {
    let code = include_str!("fixtures/endpoints_project.rs");
    let temp_dir = create_test_project(vec![("src/users.rs", code)]);

    let output = Pipeline::new()
        .run(temp_dir.path(), &CancelToken::new())
        .expect("Pipeline should succeed");

    let report = build_report(&output.resolved);
    assert_eq!(report.routes.len(), 4);
    assert!(report.diagnostics.is_empty());

    // YAML form
    let yaml = serialize_yaml(&report).expect("Failed to serialize to YAML");
    assert!(yaml.contains("routes:"));
    assert!(yaml.contains("symbol: Get_Users_0"));
    assert!(yaml.contains("pattern: /api/v1/users"));

    let parsed: serde_yaml::Value =
        serde_yaml::from_str(&yaml).expect("Generated YAML should be valid");
    assert!(parsed.get("routes").is_some());

    // JSON form
    let json = serialize_json(&report).expect("Failed to serialize to JSON");
    assert!(json.contains("\n"), "JSON should be pretty-printed");

    let parsed: serde_json::Value =
        serde_json::from_str(&json).expect("Generated JSON should be valid");
    assert_eq!(parsed["routes"][1]["symbol"], "Post_Users_1");
    assert_eq!(parsed["routes"][1]["validator"], "CreateUserValidator");

    // Text form: one line per route
    let text = serialize_text(&report);
    assert!(text.contains("get /api/v1/users -> Get_Users_0\n"));
    assert!(text.contains("post /api/v1/users -> Post_Users_1\n"));
}

#[test]
fn test_text_report_renders_diagnostic_lines() {
    let code = include_str!("fixtures/conflicted_project.rs");
    let temp_dir = create_test_project(vec![("src/orders.rs", code)]);

    let output = Pipeline::new()
        .run(temp_dir.path(), &CancelToken::new())
        .expect("Diagnostics are data, not failures");

    // Each diagnostic renders as `file:line:col severity id: message`
    let text = serialize_text(&build_report(&output.resolved));
    for line in text.lines().filter(|l| l.contains("orders.rs:")) {
        let (location, rest) = line.split_once(' ').expect("location then severity");
        let mut parts = location.rsplitn(3, ':');
        assert!(parts.next().unwrap().parse::<u32>().is_ok(), "column");
        assert!(parts.next().unwrap().parse::<u32>().is_ok(), "line");
        assert!(rest.starts_with("error ") || rest.starts_with("warning "));
    }
    assert!(text.contains("warning unused-group: group 'AbandonedGroup'"));
    assert!(text.contains("error no-verb-configured: endpoint 'SilentEndpoint'"));
}

#[test]
fn test_empty_project_handling() {
    let temp_dir = create_test_project(vec![("src/lib.rs", "// Empty file")]);

    let output = Pipeline::new()
        .run(temp_dir.path(), &CancelToken::new())
        .expect("Should handle empty projects gracefully");

    assert!(output.resolved.endpoints.is_empty());
    assert!(output.resolved.diagnostics.is_empty());

    // Both procedures still come out as well-formed no-ops
    assert!(output.generated.registration.contains("let _ = registry;"));
    assert!(output.generated.mapping.ends_with("    router\n}\n"));
}

#[test]
fn test_non_declarative_code_is_ignored() {
    let code = r#"
        pub trait Endpoint {
            fn configure(route: RouteBuilder) -> RouteBuilder;
        }

        pub struct Plain;

        impl Plain {
            pub fn configure(route: RouteBuilder) -> RouteBuilder {
                route.get("/never-seen")
            }
        }

        impl<T> Endpoint for Wrapper<T> {
            fn configure(route: RouteBuilder) -> RouteBuilder {
                route.get("/generic")
            }
        }

        impl Clone for Plain {
            fn clone(&self) -> Self {
                Plain
            }
        }
    "#;
    let temp_dir = create_test_project(vec![("src/lib.rs", code)]);

    let output = Pipeline::new()
        .run(temp_dir.path(), &CancelToken::new())
        .expect("Pipeline should succeed");

    // Trait definitions, inherent impls, generic impls, and foreign
    // traits are all outside the declaration shapes
    assert!(output.resolved.endpoints.is_empty());
    assert!(output.resolved.diagnostics.is_empty());
}
