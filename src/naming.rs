//! Deterministic route naming.
//!
//! Generated route names follow `{Verb}_{NormalizedPattern}_{Ordinal}`.
//! The normalization is a pure function of the pattern text, and the
//! ordinal comes from a total order over declarations, so names are
//! stable across runs and unique within one compiled unit.

use crate::extractor::Verb;

/// Builds the generated route name for one endpoint.
///
/// When the pattern normalizes to nothing (only parameters and version
/// segments), the name degrades to `{Verb}_{Ordinal}`.
pub fn route_name(verb: Verb, pattern: &str, ordinal: usize) -> String {
    let normalized = normalize_pattern(pattern);
    if normalized.is_empty() {
        format!("{}_{}", verb.pascal(), ordinal)
    } else {
        format!("{}_{}_{}", verb.pascal(), normalized, ordinal)
    }
}

/// Normalizes a route pattern into the identifier middle of a generated
/// name.
///
/// Per segment: route-parameter text (`{...}`) is removed, then segments
/// that are entirely an `api` or version token are dropped. What remains
/// is split at punctuation runs, version tokens are dropped once more at
/// word level (they resurface when a compound segment like `v1-users` is
/// split), and the words are title-cased and concatenated.
pub fn normalize_pattern(pattern: &str) -> String {
    let mut words: Vec<String> = Vec::new();

    for segment in pattern.split('/') {
        let cleaned = strip_route_params(segment);
        if cleaned.is_empty() || is_prefix_token(&cleaned) {
            continue;
        }
        words.extend(split_words(&cleaned));
    }

    words.retain(|word| !is_prefix_token(word));

    words.iter().map(|word| title_case(word)).collect()
}

/// Derives the automatic tag for a pattern: the first path segment that
/// is neither a route parameter nor an `api`/version token, title-cased.
/// Patterns made up entirely of such segments get no tag.
pub fn auto_tag(pattern: &str) -> Option<String> {
    for segment in pattern.split('/') {
        let cleaned = strip_route_params(segment);
        if cleaned.is_empty() || is_prefix_token(&cleaned) {
            continue;
        }
        let tag: String = split_words(&cleaned)
            .iter()
            .map(|word| title_case(word))
            .collect();
        if !tag.is_empty() {
            return Some(tag);
        }
    }
    None
}

/// Removes `{...}` spans from a segment. A segment that is entirely a
/// route parameter becomes empty and is dropped by the caller.
fn strip_route_params(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut depth = 0usize;
    for ch in segment.chars() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Splits at runs of non-alphanumeric characters, discarding empties.
fn split_words(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_string())
        .collect()
}

/// True for the standalone tokens `api` and `v`, and for version tokens
/// `v1`, `v2.0`, `v1.2.3` and so on, all case-insensitively.
fn is_prefix_token(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    if lower == "api" || lower == "v" {
        return true;
    }
    match lower.strip_prefix('v') {
        Some(rest) => {
            !rest.is_empty()
                && rest
                    .split('.')
                    .all(|part| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit()))
        }
        None => false,
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
