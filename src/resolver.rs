use crate::cancel::CancelToken;
use crate::diagnostics::{Diagnostic, DiagnosticId, Diagnostics};
use crate::error::Result;
use crate::extractor::{
    BindingSource, EndpointExtraction, FileExtraction, GroupExtraction, ValidatorExtraction, Verb,
};
use crate::location::SrcSpan;
use crate::naming;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// The accepted binding configuration of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingSpec {
    pub source: BindingSource,
    /// Explicit binding name, when a literal was given.
    pub name: Option<String>,
}

/// One endpoint that survived all invariant checks, with everything the
/// synthesizer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoint {
    pub type_name: String,
    pub span: SrcSpan,
    pub request_type: Option<String>,
    pub response_type: Option<String>,
    pub verb: Verb,
    /// Pattern as written in the verb call.
    pub local_pattern: String,
    /// Group mount pattern prepended to the local pattern, when the
    /// referenced group resolved.
    pub mount: Option<String>,
    /// Type name of the resolved group.
    pub group: Option<String>,
    /// Mount and local pattern joined; what naming and tagging see.
    pub effective_pattern: String,
    pub binding: Option<BindingSpec>,
    /// Position in the declaration total order, never reused.
    pub ordinal: usize,
    /// Generated route symbol, `{Verb}_{NormalizedPattern}_{Ordinal}`.
    pub symbol: String,
    /// Display name: explicit `named` call, else the group's name, else
    /// the generated symbol.
    pub display_name: String,
    /// Tag: explicit `tagged` call, else the group's tag, else derived
    /// from the effective pattern. Absent when nothing applies.
    pub tag: Option<String>,
    /// Type name of the associated validator, matched structurally
    /// against the request type.
    pub validator: Option<String>,
    /// Whether the validation filter is wired; `skip_validation` turns
    /// this off without dissolving the association.
    pub validate: bool,
}

/// One group that resolved to a mount pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedGroup {
    pub type_name: String,
    pub span: SrcSpan,
    pub pattern: String,
    pub name: Option<String>,
    pub tag: Option<String>,
}

/// Output of full resolution over one compiled unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedUnit {
    /// Conflict-free endpoints in declaration order.
    pub endpoints: Vec<ResolvedEndpoint>,
    /// Groups with a resolved mount pattern, in declaration order.
    pub groups: Vec<ResolvedGroup>,
    /// All detected validators, in declaration order.
    pub validators: Vec<ValidatorExtraction>,
    /// Everything found wrong, ordered by source position then id.
    pub diagnostics: Diagnostics,
}

/// What endpoint-local analysis accepted, before cross-declaration
/// resolution.
struct EndpointCore {
    verb: Verb,
    pattern: String,
    binding: Option<BindingSpec>,
    group_ref: Option<String>,
    explicit_name: Option<String>,
    explicit_tag: Option<String>,
    skip_validation: bool,
}

/// Mount pattern and labels of a group that passed its own checks.
struct GroupCore {
    pattern: String,
    name: Option<String>,
    tag: Option<String>,
}

/// One analyzed group: a group with a configuration procedure, whether
/// or not its mount calls held up.
struct GroupAnalysis {
    type_name: String,
    span: SrcSpan,
    core: Option<GroupCore>,
}

/// Conflict resolver and diagnostics engine.
///
/// Takes the raw per-file extractions, evaluates every invariant, and
/// produces the conflict-free resolved set plus all diagnostics. Each
/// declaration is analyzed on its own; group references, validator
/// association, unused-group detection, and ordinal assignment run as
/// cross-declaration phases once every declaration is in.
pub struct Resolver;

impl Resolver {
    pub fn resolve(
        extractions: &[Arc<FileExtraction>],
        cancel: &CancelToken,
    ) -> Result<ResolvedUnit> {
        cancel.checkpoint()?;

        // Declaration total order: file path, then source position.
        // Input file order is irrelevant from here on.
        let mut endpoints: Vec<&EndpointExtraction> =
            extractions.iter().flat_map(|f| &f.endpoints).collect();
        endpoints.sort_by(|a, b| a.span.cmp(&b.span));
        let mut groups: Vec<&GroupExtraction> =
            extractions.iter().flat_map(|f| &f.groups).collect();
        groups.sort_by(|a, b| a.span.cmp(&b.span));
        let mut validators: Vec<&ValidatorExtraction> =
            extractions.iter().flat_map(|f| &f.validators).collect();
        validators.sort_by(|a, b| a.span.cmp(&b.span));

        debug!(
            "Resolving {} endpoint(s), {} group(s), {} validator(s)",
            endpoints.len(),
            groups.len(),
            validators.len()
        );

        let mut diagnostics = Diagnostics::new();

        let mut analyses: Vec<GroupAnalysis> = Vec::new();
        for group in &groups {
            cancel.checkpoint()?;
            if let Some(analysis) = Self::analyze_group(group, &mut diagnostics) {
                analyses.push(analysis);
            }
        }

        // First validator in declaration order wins per target type.
        let mut validator_by_target: BTreeMap<&str, &str> = BTreeMap::new();
        for validator in &validators {
            cancel.checkpoint()?;
            if validator.legacy {
                diagnostics.push(Diagnostic::with_arg(
                    DiagnosticId::LegacyValidatorBase,
                    validator.span.clone(),
                    validator.type_name.clone(),
                ));
            }
            validator_by_target
                .entry(validator.target_type.as_str())
                .or_insert(validator.type_name.as_str());
        }

        let mut cores: Vec<(&EndpointExtraction, Option<EndpointCore>)> = Vec::new();
        for endpoint in &endpoints {
            cancel.checkpoint()?;
            cores.push((endpoint, Self::analyze_endpoint(endpoint, &mut diagnostics)));
        }

        // A group is "used" as soon as any endpoint references it in
        // source, conflicted or not.
        let referenced: HashSet<&str> = endpoints
            .iter()
            .flat_map(|e| e.groups.iter().map(|g| g.group.as_str()))
            .collect();

        let group_by_name: HashMap<&str, &GroupAnalysis> = analyses
            .iter()
            .map(|analysis| (analysis.type_name.as_str(), analysis))
            .collect();

        let mut resolved_endpoints = Vec::new();
        for (extraction, core) in cores {
            cancel.checkpoint()?;
            let Some(core) = core else { continue };

            // An unresolved reference falls back to the local pattern
            // alone; the group's own analysis already said why.
            let group = core
                .group_ref
                .as_deref()
                .and_then(|key| group_by_name.get(key))
                .and_then(|analysis| analysis.core.as_ref().map(|c| (analysis, c)));

            let mount = group.map(|(_, core)| core.pattern.clone());
            let effective_pattern = match &mount {
                Some(mount) => join_patterns(mount, &core.pattern),
                None => core.pattern.clone(),
            };

            let ordinal = resolved_endpoints.len();
            let symbol = naming::route_name(core.verb, &effective_pattern, ordinal);
            let display_name = core
                .explicit_name
                .clone()
                .or_else(|| group.and_then(|(_, c)| c.name.clone()))
                .unwrap_or_else(|| symbol.clone());
            let tag = core
                .explicit_tag
                .clone()
                .or_else(|| group.and_then(|(_, c)| c.tag.clone()))
                .or_else(|| naming::auto_tag(&effective_pattern));

            let validator = extraction
                .request_type
                .as_deref()
                .and_then(|request| validator_by_target.get(request))
                .map(|name| name.to_string());
            let validate = validator.is_some() && !core.skip_validation;

            resolved_endpoints.push(ResolvedEndpoint {
                type_name: extraction.type_name.clone(),
                span: extraction.span.clone(),
                request_type: extraction.request_type.clone(),
                response_type: extraction.response_type.clone(),
                verb: core.verb,
                local_pattern: core.pattern,
                mount,
                group: group.map(|(analysis, _)| analysis.type_name.clone()),
                effective_pattern,
                binding: core.binding,
                ordinal,
                symbol,
                display_name,
                tag,
                validator,
                validate,
            });
        }

        for analysis in &analyses {
            if !referenced.contains(analysis.type_name.as_str()) {
                diagnostics.push(Diagnostic::with_arg(
                    DiagnosticId::UnusedGroup,
                    analysis.span.clone(),
                    analysis.type_name.clone(),
                ));
            }
        }

        let resolved_groups = analyses
            .iter()
            .filter_map(|analysis| {
                analysis.core.as_ref().map(|core| ResolvedGroup {
                    type_name: analysis.type_name.clone(),
                    span: analysis.span.clone(),
                    pattern: core.pattern.clone(),
                    name: core.name.clone(),
                    tag: core.tag.clone(),
                })
            })
            .collect();

        diagnostics.sort();

        Ok(ResolvedUnit {
            endpoints: resolved_endpoints,
            groups: resolved_groups,
            validators: validators.into_iter().cloned().collect(),
            diagnostics,
        })
    }

    /// Evaluates one endpoint's own invariants. Every violated family is
    /// reported; any Error excludes the endpoint from generation.
    fn analyze_endpoint(
        endpoint: &EndpointExtraction,
        diagnostics: &mut Diagnostics,
    ) -> Option<EndpointCore> {
        let mut ok = true;

        match endpoint.verbs.len() {
            0 => {
                // Without a configuration procedure there is no better
                // anchor than the declaration itself.
                let anchor = endpoint
                    .configure_span
                    .clone()
                    .unwrap_or_else(|| endpoint.span.clone());
                diagnostics.push(Diagnostic::with_arg(
                    DiagnosticId::NoVerbConfigured,
                    anchor,
                    endpoint.type_name.clone(),
                ));
                ok = false;
            }
            1 => {}
            _ => {
                for call in &endpoint.verbs {
                    diagnostics.push(Diagnostic::with_arg(
                        DiagnosticId::MultipleVerbsConfigured,
                        call.span.clone(),
                        call.verb.method_name(),
                    ));
                }
                ok = false;
            }
        }

        if endpoint.bindings.len() > 1 {
            for call in &endpoint.bindings {
                diagnostics.push(Diagnostic::with_arg(
                    DiagnosticId::MultipleBindingCalls,
                    call.span.clone(),
                    call.source.method_name(),
                ));
            }
            ok = false;
        }

        if endpoint.groups.len() > 1 {
            for call in &endpoint.groups {
                diagnostics.push(Diagnostic::with_arg(
                    DiagnosticId::MultipleGroupCalls,
                    call.span.clone(),
                    call.group.clone(),
                ));
            }
            ok = false;
        }

        if !ok {
            return None;
        }

        Some(EndpointCore {
            verb: endpoint.verbs[0].verb,
            pattern: endpoint.verbs[0].pattern.clone().unwrap_or_default(),
            binding: endpoint.bindings.first().map(|b| BindingSpec {
                source: b.source,
                name: b.name.clone(),
            }),
            group_ref: endpoint.groups.first().map(|g| g.group.clone()),
            explicit_name: endpoint.names.iter().find_map(|n| n.value.clone()),
            explicit_tag: endpoint.tags.iter().find_map(|t| t.value.clone()),
            skip_validation: !endpoint.skip_validation.is_empty(),
        })
    }

    /// Evaluates one group's own invariants. A group without a
    /// configuration procedure is silently unmapped: there is nothing to
    /// analyze, so it returns no analysis at all.
    fn analyze_group(
        group: &GroupExtraction,
        diagnostics: &mut Diagnostics,
    ) -> Option<GroupAnalysis> {
        let configure_span = group.configure_span.as_ref()?;

        let core = match group.mounts.len() {
            0 => {
                diagnostics.push(Diagnostic::with_arg(
                    DiagnosticId::NoGroupConfigured,
                    configure_span.clone(),
                    group.type_name.clone(),
                ));
                None
            }
            1 => Some(GroupCore {
                pattern: group.mounts[0].pattern.clone().unwrap_or_default(),
                name: group.names.iter().find_map(|n| n.value.clone()),
                tag: group.tags.iter().find_map(|t| t.value.clone()),
            }),
            _ => {
                for call in &group.mounts {
                    diagnostics.push(Diagnostic::with_arg(
                        DiagnosticId::MultipleMapCalls,
                        call.span.clone(),
                        call.pattern.clone().unwrap_or_else(|| "mount".to_string()),
                    ));
                }
                None
            }
        };

        Some(GroupAnalysis {
            type_name: group.type_name.clone(),
            span: group.span.clone(),
            core,
        })
    }
}

/// Joins a group mount pattern with an endpoint-local pattern, avoiding
/// doubled slashes.
fn join_patterns(mount: &str, local: &str) -> String {
    if mount.is_empty() {
        return local.to_string();
    }
    if local.is_empty() || local == "/" {
        return mount.to_string();
    }
    let mount = mount.trim_end_matches('/');
    if local.starts_with('/') {
        format!("{}{}", mount, local)
    } else {
        format!("{}/{}", mount, local)
    }
}
