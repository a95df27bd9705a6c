//! Serialization of analysis results to YAML, JSON, or plain text.
//!
//! The resolver's output is internal; hosts that want a machine-readable
//! view of the route table and its diagnostics get an [`AnalysisReport`],
//! a flat serializable projection suitable for build logs and tooling.

use crate::error::{Error, Result};
use crate::resolver::ResolvedUnit;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Machine-readable view of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Conflict-free routes, in declaration order.
    pub routes: Vec<RouteRow>,
    /// Diagnostics ordered by source position.
    pub diagnostics: Vec<DiagnosticRow>,
}

/// One generated route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRow {
    /// Generated route symbol.
    pub symbol: String,
    /// Configured HTTP verb, lowercase.
    pub method: String,
    /// Effective pattern after group mounting.
    pub pattern: String,
    /// Endpoint type the route was derived from.
    pub endpoint: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    /// Whether the validation filter is wired into the route.
    pub validate: bool,
}

/// One diagnostic, rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRow {
    /// Stable diagnostic identifier.
    pub id: String,
    /// `"error"` or `"warning"`.
    pub severity: String,
    pub message: String,
    /// `file:line:column` of the offending call or declaration.
    pub location: String,
}

/// Projects a resolved unit into its report form.
pub fn build_report(unit: &ResolvedUnit) -> AnalysisReport {
    let routes = unit
        .endpoints
        .iter()
        .map(|endpoint| RouteRow {
            symbol: endpoint.symbol.clone(),
            method: endpoint.verb.method_name().to_string(),
            pattern: endpoint.effective_pattern.clone(),
            endpoint: endpoint.type_name.clone(),
            display_name: endpoint.display_name.clone(),
            tag: endpoint.tag.clone(),
            validator: endpoint.validator.clone(),
            validate: endpoint.validate,
        })
        .collect();

    let diagnostics = unit
        .diagnostics
        .iter()
        .map(|diagnostic| DiagnosticRow {
            id: diagnostic.id.as_str().to_string(),
            severity: diagnostic.severity().as_str().to_string(),
            message: diagnostic.message(),
            location: diagnostic.span.to_string(),
        })
        .collect();

    AnalysisReport {
        routes,
        diagnostics,
    }
}

/// Serializes a report to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(report: &AnalysisReport) -> Result<String> {
    debug!("Serializing analysis report to YAML");
    Ok(serde_yaml::to_string(report)?)
}

/// Serializes a report to JSON with pretty printing.
///
/// The output is indented for readability, making it suitable for human
/// review and version control.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(report: &AnalysisReport) -> Result<String> {
    debug!("Serializing analysis report to JSON");
    Ok(serde_json::to_string_pretty(report)?)
}

/// Renders a report as plain text, one line per route and one per
/// diagnostic. Diagnostic lines follow `file:line:col severity id:
/// message`, the shape log scrapers and editors key on.
pub fn serialize_text(report: &AnalysisReport) -> String {
    debug!("Rendering analysis report as plain text");
    let mut out = String::new();
    for route in &report.routes {
        out.push_str(&format!(
            "{} {} -> {}\n",
            route.method, route.pattern, route.symbol
        ));
    }
    for diagnostic in &report.diagnostics {
        out.push_str(&format!(
            "{} {} {}: {}\n",
            diagnostic.location, diagnostic.severity, diagnostic.id, diagnostic.message
        ));
    }
    out
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, content).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        "Successfully wrote {} bytes to {}",
        content.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostic, DiagnosticId, Diagnostics};
    use crate::extractor::Verb;
    use crate::location::SrcSpan;
    use crate::resolver::ResolvedEndpoint;
    use tempfile::TempDir;

    fn sample_unit() -> ResolvedUnit {
        let span = SrcSpan::file_start(Path::new("src/users.rs"));
        let endpoint = ResolvedEndpoint {
            type_name: "ListUsersEndpoint".to_string(),
            span: span.clone(),
            request_type: None,
            response_type: Some("UserList".to_string()),
            verb: Verb::Get,
            local_pattern: "/users".to_string(),
            mount: None,
            group: None,
            effective_pattern: "/users".to_string(),
            binding: None,
            ordinal: 0,
            symbol: "Get_Users_0".to_string(),
            display_name: "Get_Users_0".to_string(),
            tag: Some("Users".to_string()),
            validator: None,
            validate: false,
        };

        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::with_arg(
            DiagnosticId::UnusedGroup,
            SrcSpan::file_start(Path::new("src/groups.rs")),
            "AdminGroup",
        ));

        ResolvedUnit {
            endpoints: vec![endpoint],
            groups: Vec::new(),
            validators: Vec::new(),
            diagnostics,
        }
    }

    #[test]
    fn test_report_projects_routes_and_diagnostics() {
        let report = build_report(&sample_unit());

        assert_eq!(report.routes.len(), 1);
        let route = &report.routes[0];
        assert_eq!(route.symbol, "Get_Users_0");
        assert_eq!(route.method, "get");
        assert_eq!(route.pattern, "/users");
        assert_eq!(route.endpoint, "ListUsersEndpoint");

        assert_eq!(report.diagnostics.len(), 1);
        let diagnostic = &report.diagnostics[0];
        assert_eq!(diagnostic.id, "unused-group");
        assert_eq!(diagnostic.severity, "warning");
        assert_eq!(diagnostic.location, "src/groups.rs:1:1");
        assert!(diagnostic.message.contains("AdminGroup"));
    }

    #[test]
    fn test_serialize_yaml() {
        let report = build_report(&sample_unit());
        let yaml = serialize_yaml(&report).unwrap();

        assert!(yaml.contains("routes:"));
        assert!(yaml.contains("symbol: Get_Users_0"));
        assert!(yaml.contains("method: get"));
        assert!(yaml.contains("diagnostics:"));
        assert!(yaml.contains("id: unused-group"));
    }

    #[test]
    fn test_serialize_json() {
        let report = build_report(&sample_unit());
        let json = serialize_json(&report).unwrap();

        // Pretty-printed, and parses back to the same structure.
        assert!(json.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["routes"][0]["symbol"], "Get_Users_0");
        assert_eq!(parsed["diagnostics"][0]["severity"], "warning");
    }

    #[test]
    fn test_serialize_text() {
        let text = serialize_text(&build_report(&sample_unit()));

        assert!(text.contains("get /users -> Get_Users_0\n"));
        assert!(text.contains(
            "src/groups.rs:1:1 warning unused-group: \
             group 'AdminGroup' is never referenced by any endpoint\n"
        ));
    }

    #[test]
    fn test_serialize_text_empty_report() {
        let text = serialize_text(&build_report(&ResolvedUnit::default()));
        assert!(text.is_empty());
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let mut unit = sample_unit();
        unit.endpoints[0].tag = None;
        let json = serialize_json(&build_report(&unit)).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["routes"][0].get("tag").is_none());
        assert!(parsed["routes"][0].get("validator").is_none());
    }

    #[test]
    fn test_write_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("report.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir
            .path()
            .join("subdir")
            .join("nested")
            .join("report.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("report.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_empty_unit_produces_empty_report() {
        let report = build_report(&ResolvedUnit::default());

        assert!(report.routes.is_empty());
        assert!(report.diagnostics.is_empty());

        let json = serialize_json(&report).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["routes"].as_array().unwrap().len(), 0);
    }
}
