use crate::ast::{self, ExprNode};
use crate::location::SrcSpan;
use crate::parser::ParsedFile;
use log::debug;
use syn::{ImplItem, Item};

/// Capability detector for classifying type declarations.
///
/// The `CapabilityDetector` examines every `impl <Trait> for <Type>` block
/// in a parsed file and decides whether it satisfies one of the recognized
/// capability shapes. The set of shapes is closed: a trait is matched by
/// the terminal segment of its written path, so `capabilities::Endpoint`
/// and a locally imported `Endpoint` classify identically.
///
/// Recognized shapes:
/// - `Endpoint` — may expose `type Request` / `type Response` associated
///   types and a static configuration procedure named `configure`.
/// - `EndpointGroup` — exposes the same configuration procedure.
/// - `Validator` — declares the request type it validates via
///   `type Target`.
/// - `RequestValidator<T>` — the legacy validator shape; still honored,
///   but flagged downstream with an advisory warning.
///
/// Declarations that do not match any shape are skipped without comment.
/// The same applies to trait definitions, inherent impls, and generic
/// impl blocks (the abstract rendition of a capability): shape mismatch
/// is "not relevant", never an error.
pub struct CapabilityDetector;

/// Which capability contract a declaration satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Endpoint,
    EndpointGroup,
    Validator,
    LegacyValidator,
}

/// The configuration procedure of an Endpoint or EndpointGroup, already
/// lowered into the neutral expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigureBody {
    /// Location of the procedure name, where missing-configuration
    /// diagnostics point.
    pub span: SrcSpan,
    /// Lowered procedure body.
    pub body: ExprNode,
}

/// One classified declaration: the type identity, where it was declared,
/// and everything harvested from the impl block itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapabilityDecl {
    pub kind: CapabilityKind,
    /// Comparison key of the implementing type (terminal path segment).
    pub type_name: String,
    /// Location of the whole impl block.
    pub span: SrcSpan,
    /// `type Request` on an Endpoint; `None` when absent or `()`.
    pub request_type: Option<String>,
    /// `type Response` on an Endpoint; `None` when absent or `()`.
    pub response_type: Option<String>,
    /// Validated request type of a Validator (either shape).
    pub target_type: Option<String>,
    /// The configuration procedure, when present with the expected
    /// signature (static, exactly one parameter).
    pub configure: Option<ConfigureBody>,
}

/// Result of capability detection over one or more files: the three
/// disjoint declaration lists, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionResult {
    pub endpoints: Vec<CapabilityDecl>,
    pub groups: Vec<CapabilityDecl>,
    pub validators: Vec<CapabilityDecl>,
}

impl DetectionResult {
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty() && self.groups.is_empty() && self.validators.is_empty()
    }

    /// Merges another result into this one, preserving order.
    pub fn extend(&mut self, other: DetectionResult) {
        self.endpoints.extend(other.endpoints);
        self.groups.extend(other.groups);
        self.validators.extend(other.validators);
    }
}

impl CapabilityDetector {
    /// Classifies every declaration in the provided parsed files.
    ///
    /// # Arguments
    ///
    /// * `parsed_files` - Successfully parsed files, in scan order
    ///
    /// # Returns
    ///
    /// A `DetectionResult` with endpoints, groups, and validators in
    /// declaration-encounter order (file order, then source order).
    pub fn detect(parsed_files: &[ParsedFile]) -> DetectionResult {
        debug!("Classifying declarations in {} files", parsed_files.len());

        let mut result = DetectionResult::default();
        for parsed_file in parsed_files {
            result.extend(Self::classify_file(parsed_file));
        }

        debug!(
            "Detected {} endpoint(s), {} group(s), {} validator(s)",
            result.endpoints.len(),
            result.groups.len(),
            result.validators.len()
        );
        result
    }

    /// Classifies a single parsed file. This is the per-file unit of work
    /// the incremental cache stores; it depends on nothing outside the
    /// file's own syntax tree.
    pub fn classify_file(parsed_file: &ParsedFile) -> DetectionResult {
        let mut result = DetectionResult::default();
        Self::classify_items(
            &parsed_file.path,
            &parsed_file.syntax_tree.items,
            &mut result,
        );
        result
    }

    fn classify_items(file: &std::path::Path, items: &[Item], result: &mut DetectionResult) {
        for item in items {
            match item {
                Item::Impl(item_impl) => {
                    if let Some(decl) = Self::classify_impl(file, item_impl) {
                        match decl.kind {
                            CapabilityKind::Endpoint => result.endpoints.push(decl),
                            CapabilityKind::EndpointGroup => result.groups.push(decl),
                            CapabilityKind::Validator | CapabilityKind::LegacyValidator => {
                                result.validators.push(decl)
                            }
                        }
                    }
                }
                Item::Mod(module) => {
                    if let Some((_, nested)) = &module.content {
                        Self::classify_items(file, nested, result);
                    }
                }
                _ => {}
            }
        }
    }

    fn classify_impl(file: &std::path::Path, item_impl: &syn::ItemImpl) -> Option<CapabilityDecl> {
        // Only trait impls participate; inherent impls never match a shape.
        let (bang, trait_path, _) = item_impl.trait_.as_ref()?;
        if bang.is_some() {
            return None;
        }

        // A generic impl block is the abstract rendition of a capability
        // and is excluded, matching the treatment of abstract types.
        if !item_impl.generics.params.is_empty() {
            return None;
        }

        let trait_segment = trait_path.segments.last()?;
        let trait_name = trait_segment.ident.to_string();
        let type_name = ast::type_key(&item_impl.self_ty);
        let span = SrcSpan::of(file, item_impl);

        match trait_name.as_str() {
            "Endpoint" => {
                let mut decl = CapabilityDecl {
                    kind: CapabilityKind::Endpoint,
                    type_name,
                    span,
                    request_type: None,
                    response_type: None,
                    target_type: None,
                    configure: None,
                };
                Self::harvest_impl_items(file, item_impl, &mut decl);
                Some(decl)
            }
            "EndpointGroup" => {
                let mut decl = CapabilityDecl {
                    kind: CapabilityKind::EndpointGroup,
                    type_name,
                    span,
                    request_type: None,
                    response_type: None,
                    target_type: None,
                    configure: None,
                };
                Self::harvest_impl_items(file, item_impl, &mut decl);
                Some(decl)
            }
            "Validator" => {
                let target = Self::associated_type(item_impl, "Target")?;
                Some(CapabilityDecl {
                    kind: CapabilityKind::Validator,
                    type_name,
                    span,
                    request_type: None,
                    response_type: None,
                    target_type: Some(target),
                    configure: None,
                })
            }
            "RequestValidator" => {
                // Legacy shape: the validated type rides on the trait's
                // own type argument instead of an associated type.
                let target = match &trait_segment.arguments {
                    syn::PathArguments::AngleBracketed(args) => {
                        args.args.iter().find_map(|arg| match arg {
                            syn::GenericArgument::Type(ty) => Some(ast::type_key(ty)),
                            _ => None,
                        })
                    }
                    _ => None,
                }?;
                Some(CapabilityDecl {
                    kind: CapabilityKind::LegacyValidator,
                    type_name,
                    span,
                    request_type: None,
                    response_type: None,
                    target_type: Some(target),
                    configure: None,
                })
            }
            _ => None,
        }
    }

    fn harvest_impl_items(
        file: &std::path::Path,
        item_impl: &syn::ItemImpl,
        decl: &mut CapabilityDecl,
    ) {
        for impl_item in &item_impl.items {
            match impl_item {
                ImplItem::Type(assoc) => {
                    let key = ast::type_key(&assoc.ty);
                    // The unit type stands for "no such type".
                    let value = if key == "()" { None } else { Some(key) };
                    match assoc.ident.to_string().as_str() {
                        "Request" => decl.request_type = value,
                        "Response" => decl.response_type = value,
                        _ => {}
                    }
                }
                ImplItem::Fn(func) if func.sig.ident == "configure" => {
                    // Convention: static, exactly one parameter. Anything
                    // else is treated as if the procedure were absent.
                    if func.sig.receiver().is_some() || func.sig.inputs.len() != 1 {
                        continue;
                    }
                    decl.configure = Some(ConfigureBody {
                        span: SrcSpan::of(file, &func.sig.ident),
                        body: ast::lower_body(file, &func.block),
                    });
                }
                _ => {}
            }
        }
    }

    fn associated_type(item_impl: &syn::ItemImpl, name: &str) -> Option<String> {
        item_impl.items.iter().find_map(|impl_item| match impl_item {
            ImplItem::Type(assoc) if assoc.ident == name => Some(ast::type_key(&assoc.ty)),
            _ => None,
        })
    }
}
