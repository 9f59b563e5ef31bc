//! Rule matching - first rule whose extension and name patterns match wins

use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use tracing::{trace, warn};

use super::{Rule, strip_extension};
use crate::error::ProcessError;

// Compiled patterns, keyed by (pattern, case-insensitive).
// Capped at 1000 entries; cleared entirely when the cap is exceeded.
const CACHE_MAX_ENTRIES: usize = 1000;

std::thread_local! {
    static REGEX_CACHE: std::cell::RefCell<HashMap<(String, bool), Regex>> =
        std::cell::RefCell::new(HashMap::new());
}

/// Compile a pattern through the per-thread cache
pub(crate) fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex, ProcessError> {
    REGEX_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        let key = (pattern.to_string(), case_insensitive);
        if let Some(r) = cache.get(&key) {
            return Ok(r.clone());
        }
        if cache.len() >= CACHE_MAX_ENTRIES {
            cache.clear();
        }
        let r = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source| ProcessError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        cache.insert(key, r.clone());
        Ok(r)
    })
}

fn extension_pattern(file_extensions: &str) -> String {
    format!(r"\.({file_extensions})$")
}

fn name_pattern(regex: &str) -> String {
    format!("{regex}.*")
}

impl Rule {
    /// Check whether `file_name` satisfies this rule's extension and name patterns
    pub fn matches(&self, file_name: &str) -> Result<bool, ProcessError> {
        if self.file_extensions.is_empty() {
            return Ok(false);
        }

        let extensions = compile(&extension_pattern(&self.file_extensions), true)?;
        if !extensions.is_match(file_name) {
            return Ok(false);
        }

        if self.regex.is_empty() {
            return Ok(true);
        }

        let name = compile(&name_pattern(&self.regex), true)?;
        Ok(name.is_match(strip_extension(file_name)))
    }
}

/// Index of the first rule matching `file_name`.
///
/// A rule whose patterns fail to compile is logged and treated as
/// non-matching; later rules are still tried.
pub fn match_rule_index(file_name: &str, rules: &[Rule]) -> Option<usize> {
    for (index, rule) in rules.iter().enumerate() {
        match rule.matches(file_name) {
            Ok(true) => {
                trace!("Rule {} matched {}", index + 1, file_name);
                return Some(index);
            }
            Ok(false) => {}
            Err(e) => warn!("Skipping rule {} for {}: {}", index + 1, file_name, e),
        }
    }
    None
}

/// First rule matching `file_name`
pub fn match_rule<'a>(file_name: &str, rules: &'a [Rule]) -> Option<&'a Rule> {
    match_rule_index(file_name, rules).map(|i| &rules[i])
}

/// Every pattern in the rule that fails to compile
pub fn validate_rule(rule: &Rule) -> Vec<ProcessError> {
    let mut errors = Vec::new();

    if !rule.file_extensions.is_empty()
        && let Err(e) = compile(&extension_pattern(&rule.file_extensions), true)
    {
        errors.push(e);
    }

    if !rule.regex.is_empty() {
        if let Err(e) = compile(&name_pattern(&rule.regex), true) {
            errors.push(e);
        } else if rule.is_dated()
            && let Err(e) = compile(&rule.regex, false)
        {
            errors.push(e);
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(exts: &str, regex: &str) -> Rule {
        Rule::new(exts, "Dest").with_regex(regex)
    }

    #[test]
    fn test_first_match_wins() {
        let rules = vec![rule("pdf", "X"), rule("pdf", "")];

        assert_eq!(match_rule_index("report.PDF", &rules), Some(1));

        let rules = vec![rule("pdf", "rep"), rule("pdf", "")];
        assert_eq!(match_rule_index("report.pdf", &rules), Some(0));
    }

    #[test]
    fn test_extension_case_insensitive() {
        let rules = vec![rule("jpg", "")];

        assert!(match_rule("IMG.JPG", &rules).is_some());
        assert!(match_rule("img.jpg", &rules).is_some());
        assert!(match_rule("img.jpeg", &rules).is_none());
    }

    #[test]
    fn test_extension_alternation() {
        let rules = vec![rule("jpg|png", "")];

        assert!(match_rule("a.png", &rules).is_some());
        assert!(match_rule("a.jpg", &rules).is_some());
        assert!(match_rule("a.gif", &rules).is_none());
        assert!(match_rule("png", &rules).is_none());
    }

    #[test]
    fn test_empty_extensions_never_match() {
        let rules = vec![rule("", "")];

        assert!(match_rule("anything.pdf", &rules).is_none());
        assert!(match_rule("trailing.", &rules).is_none());
    }

    #[test]
    fn test_whitespace_extensions_are_literal() {
        let rules = vec![rule("  ", "")];

        assert!(match_rule("odd.  ", &rules).is_some());
        assert!(match_rule("odd.pdf", &rules).is_none());
    }

    #[test]
    fn test_name_pattern_ignores_extension() {
        let rules = vec![rule("pdf", r"\.pdf")];
        assert!(match_rule("report.pdf", &rules).is_none());

        let rules = vec![rule("pdf", "^scan")];
        assert!(match_rule("Scan_0001.pdf", &rules).is_some());
        assert!(match_rule("my scan.pdf", &rules).is_none());
    }

    #[test]
    fn test_name_pattern_is_unanchored() {
        let rules = vec![rule("md", r"\d{8}")];

        assert!(match_rule("Meeting 20240307.md", &rules).is_some());
        assert!(match_rule("Meeting.md", &rules).is_none());
    }

    #[test]
    fn test_invalid_pattern_falls_through() {
        let rules = vec![rule("pdf", "(unclosed"), rule("pdf", "")];
        assert_eq!(match_rule_index("report.pdf", &rules), Some(1));

        let rules = vec![rule("pdf|(", ""), rule("pdf", "")];
        assert_eq!(match_rule_index("report.pdf", &rules), Some(1));

        assert!(rules[0].matches("report.pdf").is_err());
    }

    #[test]
    fn test_validate_rule() {
        assert!(validate_rule(&rule("pdf", r"\d{8}")).is_empty());
        assert_eq!(validate_rule(&rule("pdf(", "[")).len(), 2);
        assert!(validate_rule(&rule("", "")).is_empty());
    }
}
