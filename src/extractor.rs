use crate::ast::ExprNode;
use crate::detector::{CapabilityDecl, CapabilityDetector, CapabilityKind};
use crate::location::SrcSpan;
use crate::parser::ParsedFile;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP verb vocabulary. Closed set: a configuration call is a verb call
/// exactly when its member name is one of these, lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn from_method(name: &str) -> Option<Verb> {
        match name {
            "get" => Some(Verb::Get),
            "post" => Some(Verb::Post),
            "put" => Some(Verb::Put),
            "patch" => Some(Verb::Patch),
            "delete" => Some(Verb::Delete),
            _ => None,
        }
    }

    /// The builder method name, as written in source.
    pub fn method_name(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
        }
    }

    /// Title-cased rendering used by generated route names.
    pub fn pascal(&self) -> &'static str {
        match self {
            Verb::Get => "Get",
            Verb::Post => "Post",
            Verb::Put => "Put",
            Verb::Patch => "Patch",
            Verb::Delete => "Delete",
        }
    }
}

/// Where a request's data is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BindingSource {
    Body,
    Query,
    Path,
    Header,
    Form,
    Params,
}

impl BindingSource {
    pub fn from_method(name: &str) -> Option<BindingSource> {
        match name {
            "bind_body" => Some(BindingSource::Body),
            "bind_query" => Some(BindingSource::Query),
            "bind_path" => Some(BindingSource::Path),
            "bind_header" => Some(BindingSource::Header),
            "bind_form" => Some(BindingSource::Form),
            "bind_params" => Some(BindingSource::Params),
            _ => None,
        }
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            BindingSource::Body => "bind_body",
            BindingSource::Query => "bind_query",
            BindingSource::Path => "bind_path",
            BindingSource::Header => "bind_header",
            BindingSource::Form => "bind_form",
            BindingSource::Params => "bind_params",
        }
    }
}

/// One verb call occurrence. `pattern` is `None` when the pattern
/// argument was present but not a string literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerbCall {
    pub verb: Verb,
    pub pattern: Option<String>,
    pub span: SrcSpan,
}

/// One binding-source call occurrence. `name` carries the explicit
/// binding name when a string literal was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingCall {
    pub source: BindingSource,
    pub name: Option<String>,
    pub span: SrcSpan,
}

/// One group-reference call occurrence, `in_group::<G>()`. The group is
/// identified by the comparison key of its turbofish type argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupCall {
    pub group: String,
    pub span: SrcSpan,
}

/// One mount call occurrence on an EndpointGroup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MountCall {
    pub pattern: Option<String>,
    pub span: SrcSpan,
}

/// One display-name or tag call occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelCall {
    pub value: Option<String>,
    pub span: SrcSpan,
}

/// Raw extraction result for one Endpoint declaration. Every occurrence
/// of every recognized call is recorded, in source order, so the resolver
/// can report each conflicting call individually.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointExtraction {
    pub type_name: String,
    pub span: SrcSpan,
    /// Location of the configuration procedure, when present.
    pub configure_span: Option<SrcSpan>,
    pub request_type: Option<String>,
    pub response_type: Option<String>,
    pub verbs: Vec<VerbCall>,
    pub bindings: Vec<BindingCall>,
    pub groups: Vec<GroupCall>,
    pub names: Vec<LabelCall>,
    pub tags: Vec<LabelCall>,
    /// Locations of `skip_validation()` calls.
    pub skip_validation: Vec<SrcSpan>,
}

/// Raw extraction result for one EndpointGroup declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupExtraction {
    pub type_name: String,
    pub span: SrcSpan,
    pub configure_span: Option<SrcSpan>,
    pub mounts: Vec<MountCall>,
    pub names: Vec<LabelCall>,
    pub tags: Vec<LabelCall>,
}

/// Extraction result for one Validator declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatorExtraction {
    pub type_name: String,
    pub span: SrcSpan,
    /// The request type this validator declares itself against.
    pub target_type: String,
    /// True for the legacy `RequestValidator<T>` shape.
    pub legacy: bool,
}

/// Everything extracted from one source file. This is the unit the
/// incremental cache stores and compares across runs: it is a pure
/// function of the file's own text, and all fields are value types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileExtraction {
    pub file: PathBuf,
    pub endpoints: Vec<EndpointExtraction>,
    pub groups: Vec<GroupExtraction>,
    pub validators: Vec<ValidatorExtraction>,
}

impl FileExtraction {
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty() && self.groups.is_empty() && self.validators.is_empty()
    }
}

/// Metadata extractor: walks each configuration procedure's lowered body
/// and records every occurrence of the routing vocabulary.
///
/// The walk is purely textual. A call inside a dead `if` branch counts
/// exactly like one at the top level; no reachability analysis is done.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Classifies and extracts one parsed file.
    pub fn extract_file(parsed_file: &ParsedFile) -> FileExtraction {
        let detected = CapabilityDetector::classify_file(parsed_file);
        debug!(
            "Extracting {}: {} endpoint(s), {} group(s), {} validator(s)",
            parsed_file.path.display(),
            detected.endpoints.len(),
            detected.groups.len(),
            detected.validators.len()
        );

        FileExtraction {
            file: parsed_file.path.clone(),
            endpoints: detected.endpoints.iter().map(Self::extract_endpoint).collect(),
            groups: detected.groups.iter().map(Self::extract_group).collect(),
            validators: detected.validators.iter().map(Self::extract_validator).collect(),
        }
    }

    /// Extracts the raw routing calls from one Endpoint declaration.
    pub fn extract_endpoint(decl: &CapabilityDecl) -> EndpointExtraction {
        let mut extraction = EndpointExtraction {
            type_name: decl.type_name.clone(),
            span: decl.span.clone(),
            configure_span: decl.configure.as_ref().map(|c| c.span.clone()),
            request_type: decl.request_type.clone(),
            response_type: decl.response_type.clone(),
            verbs: Vec::new(),
            bindings: Vec::new(),
            groups: Vec::new(),
            names: Vec::new(),
            tags: Vec::new(),
            skip_validation: Vec::new(),
        };

        if let Some(configure) = &decl.configure {
            configure.body.walk(&mut |node| {
                let (method, type_args, args, span) = match node {
                    ExprNode::MethodCall {
                        method,
                        type_args,
                        args,
                        span,
                        ..
                    } => (method.as_str(), type_args, args, span),
                    _ => return,
                };

                if let Some(verb) = Verb::from_method(method) {
                    extraction.verbs.push(VerbCall {
                        verb,
                        pattern: first_str_arg(args),
                        span: span.clone(),
                    });
                } else if let Some(source) = BindingSource::from_method(method) {
                    extraction.bindings.push(BindingCall {
                        source,
                        name: first_str_arg(args),
                        span: span.clone(),
                    });
                } else {
                    match method {
                        // The group reference rides on the turbofish; a
                        // call without one names no type and is skipped.
                        "in_group" => {
                            if let Some(group) = type_args.first() {
                                extraction.groups.push(GroupCall {
                                    group: group.clone(),
                                    span: span.clone(),
                                });
                            }
                        }
                        "named" => extraction.names.push(LabelCall {
                            value: first_str_arg(args),
                            span: span.clone(),
                        }),
                        "tagged" => extraction.tags.push(LabelCall {
                            value: first_str_arg(args),
                            span: span.clone(),
                        }),
                        "skip_validation" => extraction.skip_validation.push(span.clone()),
                        _ => {}
                    }
                }
            });
        }

        // The walk visits a fluent chain outside-in; spans put each
        // bucket back into source order.
        extraction.verbs.sort_by(|a, b| a.span.cmp(&b.span));
        extraction.bindings.sort_by(|a, b| a.span.cmp(&b.span));
        extraction.groups.sort_by(|a, b| a.span.cmp(&b.span));
        extraction.names.sort_by(|a, b| a.span.cmp(&b.span));
        extraction.tags.sort_by(|a, b| a.span.cmp(&b.span));
        extraction.skip_validation.sort();

        extraction
    }

    /// Extracts the raw mount and label calls from one EndpointGroup
    /// declaration.
    pub fn extract_group(decl: &CapabilityDecl) -> GroupExtraction {
        let mut extraction = GroupExtraction {
            type_name: decl.type_name.clone(),
            span: decl.span.clone(),
            configure_span: decl.configure.as_ref().map(|c| c.span.clone()),
            mounts: Vec::new(),
            names: Vec::new(),
            tags: Vec::new(),
        };

        if let Some(configure) = &decl.configure {
            configure.body.walk(&mut |node| {
                let (method, args, span) = match node {
                    ExprNode::MethodCall {
                        method, args, span, ..
                    } => (method.as_str(), args, span),
                    _ => return,
                };

                match method {
                    "mount" => extraction.mounts.push(MountCall {
                        pattern: first_str_arg(args),
                        span: span.clone(),
                    }),
                    "named" => extraction.names.push(LabelCall {
                        value: first_str_arg(args),
                        span: span.clone(),
                    }),
                    "tagged" => extraction.tags.push(LabelCall {
                        value: first_str_arg(args),
                        span: span.clone(),
                    }),
                    _ => {}
                }
            });
        }

        extraction.mounts.sort_by(|a, b| a.span.cmp(&b.span));
        extraction.names.sort_by(|a, b| a.span.cmp(&b.span));
        extraction.tags.sort_by(|a, b| a.span.cmp(&b.span));

        extraction
    }

    pub fn extract_validator(decl: &CapabilityDecl) -> ValidatorExtraction {
        ValidatorExtraction {
            type_name: decl.type_name.clone(),
            span: decl.span.clone(),
            target_type: decl.target_type.clone().unwrap_or_default(),
            legacy: decl.kind == CapabilityKind::LegacyValidator,
        }
    }
}

/// First string-literal argument of a call, if any. A present but
/// non-literal argument yields `None`: the feature is recorded as
/// "configured, name unresolved" rather than an error.
fn first_str_arg(args: &[ExprNode]) -> Option<String> {
    args.iter()
        .find_map(|arg| arg.as_str_lit().map(|s| s.to_string()))
}
