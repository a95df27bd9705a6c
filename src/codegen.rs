use crate::cancel::CancelToken;
use crate::error::Result;
use crate::resolver::{ResolvedEndpoint, ResolvedUnit};
use log::debug;
use std::collections::HashSet;

/// The two generated registration procedures for one compiled unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Source of `register_validators`.
    pub registration: String,
    /// Source of `map_endpoints`.
    pub mapping: String,
}

impl GeneratedUnit {
    /// Both procedures as one generated source file.
    pub fn combined(&self) -> String {
        format!(
            "// @generated by routegen. Manual edits will be overwritten.\n\n{}\n{}",
            self.registration, self.mapping
        )
    }
}

/// Code synthesizer.
///
/// Emits the two generated procedures from a resolved unit, in
/// declaration order. Conflicted declarations never reach this stage;
/// the resolver already excluded and diagnosed them. An empty unit still
/// yields both procedures, as well-formed no-ops, so the host's call
/// sites stay valid.
pub struct CodeSynthesizer;

impl CodeSynthesizer {
    pub fn synthesize(unit: &ResolvedUnit, cancel: &CancelToken) -> Result<GeneratedUnit> {
        cancel.checkpoint()?;
        debug!(
            "Synthesizing registration for {} endpoint(s)",
            unit.endpoints.len()
        );

        Ok(GeneratedUnit {
            registration: Self::registration_procedure(unit, cancel)?,
            mapping: Self::mapping_procedure(unit, cancel)?,
        })
    }

    /// Emits `register_validators`: one registry line per distinct
    /// (request type, validator) association, in first-encounter order.
    /// Registration is not affected by `skip_validation`; that call only
    /// unhooks the route filter.
    fn registration_procedure(unit: &ResolvedUnit, cancel: &CancelToken) -> Result<String> {
        let mut out = String::from("pub fn register_validators(registry: &mut ValidatorRegistry) {\n");

        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut lines = Vec::new();
        for endpoint in &unit.endpoints {
            cancel.checkpoint()?;
            let (Some(request), Some(validator)) =
                (endpoint.request_type.as_deref(), endpoint.validator.as_deref())
            else {
                continue;
            };
            if seen.insert((request, validator)) {
                lines.push(format!(
                    "    registry.register::<{}, {}>();\n",
                    request, validator
                ));
            }
        }

        if lines.is_empty() {
            out.push_str("    let _ = registry;\n");
        } else {
            for line in lines {
                out.push_str(&line);
            }
        }
        out.push_str("}\n");
        Ok(out)
    }

    /// Emits `map_endpoints`: one builder chain per endpoint, each ending
    /// in the endpoint's own configuration procedure so user-written
    /// builder customization is preserved.
    fn mapping_procedure(unit: &ResolvedUnit, cancel: &CancelToken) -> Result<String> {
        let mut out = String::from("pub fn map_endpoints(router: Router) -> Router {\n");

        for endpoint in &unit.endpoints {
            cancel.checkpoint()?;
            out.push_str(&Self::endpoint_block(endpoint));
            out.push('\n');
        }

        out.push_str("    router\n}\n");
        Ok(out)
    }

    fn endpoint_block(endpoint: &ResolvedEndpoint) -> String {
        let mut chain: Vec<String> = Vec::new();
        chain.push(format!(
            "        .mount({:?})",
            endpoint.mount.as_deref().unwrap_or("/")
        ));
        chain.push(format!(
            "        .{}({:?})",
            endpoint.verb.method_name(),
            endpoint.local_pattern
        ));
        chain.push(format!("        .handle({}::handle)", endpoint.type_name));
        if let Some(binding) = &endpoint.binding {
            match &binding.name {
                Some(name) => chain.push(format!(
                    "        .{}({:?})",
                    binding.source.method_name(),
                    name
                )),
                None => chain.push(format!("        .{}()", binding.source.method_name())),
            }
        }
        if let Some(tag) = &endpoint.tag {
            chain.push(format!("        .tag({:?})", tag));
        }
        chain.push(format!("        .name({:?})", endpoint.display_name));
        if endpoint.validate {
            if let Some(request) = &endpoint.request_type {
                chain.push(format!("        .validate::<{}>()", request));
            }
        }

        let mut block = format!(
            "    // {}: {} {}\n",
            endpoint.type_name,
            endpoint.verb.method_name(),
            endpoint.effective_pattern
        );
        block.push_str("    let route = RouteBuilder::new()\n");
        block.push_str(&chain.join("\n"));
        block.push_str(";\n");
        block.push_str(&format!(
            "    let router = router.route({}::configure(route));\n",
            endpoint.type_name
        ));
        block
    }
}
