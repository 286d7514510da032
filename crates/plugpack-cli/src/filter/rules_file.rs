//! Per-plugin filter overrides in `Config/FilterPlugin.ini`
//!
//! ```ini
//! [FilterPlugin]
//! ; ship the docs, but not the drafts
//! /Docs/...
//! -/Docs/Drafts/...
//! ```

use crate::errors::PipelineError;
use crate::filter::{Disposition, FilterRule, RuleTier};
use std::fs;
use std::path::Path;

/// Location of the override file relative to the plugin directory
pub const FILTER_FILE: &str = "Config/FilterPlugin.ini";

/// Section holding the rules
pub const FILTER_SECTION: &str = "FilterPlugin";

/// Rule lines of `section`, in file order.
///
/// A leading `-` marks an exclude, an optional leading `+` an include. Blank
/// lines and lines starting with `;` or `#` are skipped. A leading byte order
/// mark is ignored.
pub fn parse_section<'a>(content: &'a str, section: &str) -> Vec<(Disposition, &'a str)> {
    let content = content.trim_start_matches('\u{feff}');
    let mut in_section = false;
    let mut rules = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim().eq_ignore_ascii_case(section);
            continue;
        }
        if !in_section {
            continue;
        }

        let (disposition, pattern) = if let Some(rest) = line.strip_prefix('-') {
            (Disposition::Exclude, rest.trim_start())
        } else if let Some(rest) = line.strip_prefix('+') {
            (Disposition::Include, rest.trim_start())
        } else {
            (Disposition::Include, line)
        };
        if !pattern.is_empty() {
            rules.push((disposition, pattern));
        }
    }
    rules
}

/// Read user rules from `path`. A missing file yields no rules.
pub fn read_rules(path: &Path, section: &str) -> Result<Vec<FilterRule>, PipelineError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|source| PipelineError::FilterFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_section(&content, section)
        .into_iter()
        .map(|(disposition, pattern)| FilterRule::new(pattern, disposition, RuleTier::User))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
[Other]
/Ignored/...

[FilterPlugin]
; documentation
/Docs/...
-/Docs/Drafts/...
+ /Extras/*.txt
# trailing comment

[Next]
/AlsoIgnored/...
";

    #[test]
    fn test_only_named_section_is_read() {
        let rules = parse_section(SAMPLE, FILTER_SECTION);
        assert_eq!(
            rules,
            vec![
                (Disposition::Include, "/Docs/..."),
                (Disposition::Exclude, "/Docs/Drafts/..."),
                (Disposition::Include, "/Extras/*.txt"),
            ]
        );
    }

    #[test]
    fn test_byte_order_mark_before_section_header() {
        let content = "\u{feff}[FilterPlugin]\n/Docs/...\n-/Source/Private/...\n";
        assert_eq!(
            parse_section(content, FILTER_SECTION),
            vec![
                (Disposition::Include, "/Docs/..."),
                (Disposition::Exclude, "/Source/Private/..."),
            ]
        );
    }

    #[test]
    fn test_read_rules_from_file_with_byte_order_mark() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let path = temp.path().join("FilterPlugin.ini");
        fs::write(&path, format!("\u{feff}{SAMPLE}"))?;

        let rules = read_rules(&path, FILTER_SECTION)?;
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[1].disposition, Disposition::Exclude);
        assert!(rules[1].matches("Docs/Drafts/Plan.md"));
        Ok(())
    }

    #[test]
    fn test_read_rules_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let path = temp.path().join("FilterPlugin.ini");
        fs::write(&path, SAMPLE)?;

        let rules = read_rules(&path, FILTER_SECTION)?;
        assert_eq!(rules.len(), 3);
        assert!(rules.iter().all(|r| r.tier == RuleTier::User));
        assert!(read_rules(&temp.path().join("absent.ini"), FILTER_SECTION)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_unreadable_file_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        // A directory in place of the file cannot be read as text
        let path = temp.path().join("FilterPlugin.ini");
        fs::create_dir(&path)?;
        assert!(matches!(
            read_rules(&path, FILTER_SECTION),
            Err(PipelineError::FilterFile { .. })
        ));
        Ok(())
    }
}
