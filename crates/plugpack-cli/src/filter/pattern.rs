//! Wildcard patterns for plugin-relative paths
//!
//! Paths are matched in the form `/Dir/File.ext`, rooted at the plugin
//! directory. Patterns use:
//!
//! - leading `/`: anchored at the plugin root, otherwise matches at any depth
//! - `...`: any run of characters, including `/`
//! - `*`: any run of characters within one path segment
//! - `?`: one character other than `/`
//! - trailing `/`: the whole tree below, same as `/...`
//!
//! Matching ignores case.

use crate::errors::PipelineError;
use regex::Regex;

/// Compile a wildcard pattern into an anchored, case-insensitive regex
pub fn compile(pattern: &str) -> Result<Regex, PipelineError> {
    let normalized = normalize(pattern).ok_or_else(|| PipelineError::InvalidPattern {
        pattern: pattern.to_string(),
        message: "pattern is empty".to_string(),
    })?;

    let mut expr = String::with_capacity(normalized.len() * 2 + 8);
    expr.push_str("(?i)^");

    let mut rest = normalized.as_str();
    while let Some(c) = rest.chars().next() {
        if rest.starts_with("/.../") {
            expr.push_str("/(?:.*/)?");
            rest = &rest[5..];
        } else if rest.starts_with("...") {
            expr.push_str(".*");
            rest = &rest[3..];
        } else {
            match c {
                '*' => expr.push_str("[^/]*"),
                '?' => expr.push_str("[^/]"),
                _ => expr.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
            }
            rest = &rest[c.len_utf8()..];
        }
    }
    expr.push('$');

    Regex::new(&expr).map_err(|e| PipelineError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Compile a regex that matches exactly one plugin-relative path
pub fn compile_literal(relative_path: &str) -> Result<Regex, PipelineError> {
    let path = to_match_path(relative_path);
    Regex::new(&format!("(?i)^{}$", regex::escape(&path))).map_err(|e| {
        PipelineError::InvalidPattern {
            pattern: relative_path.to_string(),
            message: e.to_string(),
        }
    })
}

/// Bring a relative path into the `/Dir/File` form patterns are matched against
pub fn to_match_path(relative_path: &str) -> String {
    let path = relative_path.replace('\\', "/");
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

fn normalize(pattern: &str) -> Option<String> {
    let mut pattern = pattern.trim().replace('\\', "/");
    if pattern.is_empty() {
        return None;
    }
    if pattern.ends_with('/') {
        pattern.push_str("...");
    }
    if pattern.starts_with('/') {
        Some(pattern)
    } else if pattern.starts_with("...") {
        Some(format!("/{pattern}"))
    } else {
        Some(format!("/.../{pattern}"))
    }
}
