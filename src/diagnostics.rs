//! Structured routing diagnostics.
//!
//! Every invariant violation the resolver finds becomes a [`Diagnostic`]:
//! a stable identifier, a severity, a precise source span, and positional
//! message arguments. Hosts key on the identifier, so the catalogue is
//! closed and its string forms never change.
//!
//! Diagnostics are never threaded through shared mutable state. Each
//! stage returns its findings in a [`Diagnostics`] accumulator and the
//! caller merges them, which keeps per-declaration analysis freely
//! parallelizable.

use crate::location::SrcSpan;
use std::fmt;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Advisory; generation proceeds unaffected.
    Warning,
    /// Invariant violation; the declaration is excluded from generation.
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Which family of invariant a diagnostic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Zero calls for a required single-valued feature.
    MissingConfiguration,
    /// Two or more calls for a single-valued feature.
    StructuralConflict,
    /// Suspicious but valid; never blocks generation.
    AdvisoryConflict,
}

/// The closed diagnostic catalogue.
///
/// The `as_str` form is the stable public identifier; everything else
/// (title, severity, category, message template) hangs off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticId {
    /// Endpoint configures no HTTP verb.
    NoVerbConfigured,
    /// Endpoint configures more than one HTTP verb; one per extra call.
    MultipleVerbsConfigured,
    /// Group configures no mount pattern.
    NoGroupConfigured,
    /// Endpoint references more than one group; one per call.
    MultipleGroupCalls,
    /// Group configures more than one mount; one per call.
    MultipleMapCalls,
    /// Group is never referenced by any endpoint.
    UnusedGroup,
    /// Endpoint configures more than one binding source; one per call.
    MultipleBindingCalls,
    /// Validator declared through the legacy base shape.
    LegacyValidatorBase,
}

impl DiagnosticId {
    /// Stable string identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticId::NoVerbConfigured => "no-verb-configured",
            DiagnosticId::MultipleVerbsConfigured => "multiple-verbs-configured",
            DiagnosticId::NoGroupConfigured => "no-group-configured",
            DiagnosticId::MultipleGroupCalls => "multiple-group-calls",
            DiagnosticId::MultipleMapCalls => "multiple-map-calls",
            DiagnosticId::UnusedGroup => "unused-group",
            DiagnosticId::MultipleBindingCalls => "multiple-binding-calls",
            DiagnosticId::LegacyValidatorBase => "legacy-validator-base",
        }
    }

    /// Short human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            DiagnosticId::NoVerbConfigured => "no verb configured",
            DiagnosticId::MultipleVerbsConfigured => "multiple verbs configured",
            DiagnosticId::NoGroupConfigured => "no mount configured",
            DiagnosticId::MultipleGroupCalls => "multiple group references",
            DiagnosticId::MultipleMapCalls => "multiple mount calls",
            DiagnosticId::UnusedGroup => "unused group",
            DiagnosticId::MultipleBindingCalls => "multiple binding calls",
            DiagnosticId::LegacyValidatorBase => "legacy validator base",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            DiagnosticId::UnusedGroup | DiagnosticId::LegacyValidatorBase => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn category(self) -> Category {
        match self {
            DiagnosticId::NoVerbConfigured | DiagnosticId::NoGroupConfigured => {
                Category::MissingConfiguration
            }
            DiagnosticId::MultipleVerbsConfigured
            | DiagnosticId::MultipleGroupCalls
            | DiagnosticId::MultipleMapCalls
            | DiagnosticId::MultipleBindingCalls => Category::StructuralConflict,
            DiagnosticId::UnusedGroup | DiagnosticId::LegacyValidatorBase => {
                Category::AdvisoryConflict
            }
        }
    }

    /// Message template with `{0}`-style positional arguments.
    fn template(self) -> &'static str {
        match self {
            DiagnosticId::NoVerbConfigured => "endpoint '{0}' configures no HTTP verb",
            DiagnosticId::MultipleVerbsConfigured => {
                "conflicting verb call '{0}'; an endpoint must configure exactly one verb"
            }
            DiagnosticId::NoGroupConfigured => "group '{0}' configures no mount pattern",
            DiagnosticId::MultipleGroupCalls => {
                "conflicting group reference '{0}'; an endpoint may join at most one group"
            }
            DiagnosticId::MultipleMapCalls => {
                "conflicting mount call '{0}'; a group must configure exactly one mount"
            }
            DiagnosticId::UnusedGroup => "group '{0}' is never referenced by any endpoint",
            DiagnosticId::MultipleBindingCalls => {
                "conflicting binding call '{0}'; an endpoint may configure at most one binding source"
            }
            DiagnosticId::LegacyValidatorBase => {
                "validator '{0}' is declared through the legacy RequestValidator shape; declare a Target through Validator instead"
            }
        }
    }
}

/// One positioned diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub id: DiagnosticId,
    pub span: SrcSpan,
    /// Positional arguments substituted into the message template.
    pub args: Vec<String>,
}

impl Diagnostic {
    pub fn new(id: DiagnosticId, span: SrcSpan, args: Vec<String>) -> Self {
        Self { id, span, args }
    }

    /// Convenience constructor for single-argument diagnostics, which is
    /// every entry in the current catalogue.
    pub fn with_arg(id: DiagnosticId, span: SrcSpan, arg: impl Into<String>) -> Self {
        Self::new(id, span, vec![arg.into()])
    }

    pub fn severity(&self) -> Severity {
        self.id.severity()
    }

    pub fn category(&self) -> Category {
        self.id.category()
    }

    /// Renders the message template with this diagnostic's arguments.
    pub fn message(&self) -> String {
        let mut message = self.id.template().to_string();
        for (index, arg) in self.args.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", index), arg);
        }
        message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] at {}",
            self.severity().as_str(),
            self.message(),
            self.id.as_str(),
            self.span
        )
    }
}

/// Accumulator of diagnostics produced by one stage.
///
/// Stages build their own accumulator and the caller merges; ordering is
/// made deterministic with [`Diagnostics::sort`], which orders by source
/// position and then identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Absorbs another accumulator, preserving its order.
    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Deterministic order: span first, then identifier.
    pub fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| a.span.cmp(&b.span).then_with(|| a.id.cmp(&b.id)));
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.severity() == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity() == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn span_at(line: usize) -> SrcSpan {
        SrcSpan {
            file: PathBuf::from("src/users.rs"),
            start_line: line,
            start_col: 4,
            end_line: line,
            end_col: 8,
        }
    }

    #[test]
    fn test_identifiers_are_stable() {
        assert_eq!(DiagnosticId::NoVerbConfigured.as_str(), "no-verb-configured");
        assert_eq!(
            DiagnosticId::MultipleVerbsConfigured.as_str(),
            "multiple-verbs-configured"
        );
        assert_eq!(DiagnosticId::NoGroupConfigured.as_str(), "no-group-configured");
        assert_eq!(DiagnosticId::MultipleGroupCalls.as_str(), "multiple-group-calls");
        assert_eq!(DiagnosticId::MultipleMapCalls.as_str(), "multiple-map-calls");
        assert_eq!(DiagnosticId::UnusedGroup.as_str(), "unused-group");
        assert_eq!(
            DiagnosticId::MultipleBindingCalls.as_str(),
            "multiple-binding-calls"
        );
        assert_eq!(
            DiagnosticId::LegacyValidatorBase.as_str(),
            "legacy-validator-base"
        );
    }

    #[test]
    fn test_severity_assignment() {
        assert_eq!(DiagnosticId::NoVerbConfigured.severity(), Severity::Error);
        assert_eq!(DiagnosticId::MultipleMapCalls.severity(), Severity::Error);
        assert_eq!(DiagnosticId::UnusedGroup.severity(), Severity::Warning);
        assert_eq!(DiagnosticId::LegacyValidatorBase.severity(), Severity::Warning);
    }

    #[test]
    fn test_category_assignment() {
        assert_eq!(
            DiagnosticId::NoVerbConfigured.category(),
            Category::MissingConfiguration
        );
        assert_eq!(
            DiagnosticId::MultipleBindingCalls.category(),
            Category::StructuralConflict
        );
        assert_eq!(
            DiagnosticId::UnusedGroup.category(),
            Category::AdvisoryConflict
        );
    }

    #[test]
    fn test_message_substitution() {
        let diagnostic =
            Diagnostic::with_arg(DiagnosticId::MultipleVerbsConfigured, span_at(3), "post");

        assert_eq!(
            diagnostic.message(),
            "conflicting verb call 'post'; an endpoint must configure exactly one verb"
        );
    }

    #[test]
    fn test_display_includes_id_and_location() {
        let diagnostic = Diagnostic::with_arg(DiagnosticId::UnusedGroup, span_at(7), "AdminGroup");

        let rendered = diagnostic.to_string();
        assert!(rendered.starts_with("warning:"));
        assert!(rendered.contains("[unused-group]"));
        assert!(rendered.contains("src/users.rs:7:5"));
    }

    #[test]
    fn test_sort_orders_by_span_then_id() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::with_arg(
            DiagnosticId::MultipleVerbsConfigured,
            span_at(9),
            "post",
        ));
        diagnostics.push(Diagnostic::with_arg(
            DiagnosticId::NoVerbConfigured,
            span_at(2),
            "PingEndpoint",
        ));
        diagnostics.push(Diagnostic::with_arg(
            DiagnosticId::MultipleBindingCalls,
            span_at(9),
            "bind_query",
        ));

        diagnostics.sort();

        let ids: Vec<&str> = diagnostics.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "no-verb-configured",
                "multiple-verbs-configured",
                "multiple-binding-calls"
            ]
        );
    }

    #[test]
    fn test_merge_and_counts() {
        let mut first = Diagnostics::new();
        first.push(Diagnostic::with_arg(
            DiagnosticId::NoVerbConfigured,
            span_at(1),
            "PingEndpoint",
        ));

        let mut second = Diagnostics::new();
        second.push(Diagnostic::with_arg(
            DiagnosticId::UnusedGroup,
            span_at(5),
            "AdminGroup",
        ));

        first.merge(second);

        assert_eq!(first.len(), 2);
        assert_eq!(first.error_count(), 1);
        assert_eq!(first.warning_count(), 1);
        assert!(first.has_errors());
    }

    #[test]
    fn test_empty_accumulator_has_no_errors() {
        let diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        assert!(!diagnostics.has_errors());
    }
}
