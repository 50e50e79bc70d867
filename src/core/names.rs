//! Conversions from free-form names (branches, titles) to Concourse identifiers

use regex::Regex;
use std::sync::LazyLock;

/// Runs of characters Concourse does not accept in names
static INVALID_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").expect("literal pattern is valid"));

/// Turn an arbitrary string into a valid pipeline name
///
/// Lowercases, collapses runs of unsupported characters into `-` and trims
/// leading and trailing separators: `Feature/ABC-12 fix` → `feature-abc-12-fix`.
pub fn pipeline_name(raw: &str) -> String {
    INVALID_CHARACTERS
        .replace_all(&raw.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Turn a branch name into a valid image tag
pub fn image_tag(branch: &str) -> String {
    let tag = pipeline_name(branch);
    if tag.is_empty() {
        "latest".to_string()
    } else {
        tag
    }
}
