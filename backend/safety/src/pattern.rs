//! Regex screening for whitelist entries and ad-hoc search patterns.
//!
//! Two layers run before anything is compiled: a hard length cap, and a
//! textual scan for a few well-known catastrophic-backtracking shapes. The scan
//! looks at the pattern source, not its automaton, so it is approximate: it
//! flags some harmless patterns and misses others.
//!
//! Patterns we compile ourselves go through the `regex` crate, which matches in
//! linear time and cannot backtrack. The textual screen still matters because
//! search patterns are also handed to external tools (`grep -E`) whose engines
//! do backtrack.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use warden_core::PatternError;

/// Longest accepted pattern, in characters.
pub const MAX_PATTERN_LEN: usize = 200;

/// Cap on the compiled program size for a single pattern.
const COMPILED_SIZE_LIMIT: usize = 1 << 20;

/// Known exponential-backtracking signatures, matched against pattern source.
static DANGEROUS_SHAPES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        // (a+)+  (a+b)*  (\d+){2,}
        ("nested quantifier (...+)+", r"\([^()]*\+[^()]*\)[+*{]"),
        // (a*)*  (.*x)+
        ("nested quantifier (...*)*", r"\([^()]*\*[^()]*\)[+*{]"),
        // (\w+)+\w+  (ab)+c+
        ("repeated-plus chain (...)+x+", r"\)[+*](?:\\\w|\w|\.)[+*]"),
    ]
    .into_iter()
    .map(|(name, src)| (name, Regex::new(src).unwrap()))
    .collect()
});

/// Check a pattern's length and shape without compiling it.
pub fn validate_pattern(pattern: &str) -> Result<(), PatternError> {
    let len = pattern.chars().count();
    if len > MAX_PATTERN_LEN {
        return Err(PatternError::TooLong {
            len,
            max: MAX_PATTERN_LEN,
        });
    }

    for (signature, shape) in DANGEROUS_SHAPES.iter() {
        if shape.is_match(pattern) {
            return Err(PatternError::Dangerous {
                signature: *signature,
            });
        }
    }

    Ok(())
}

/// Validate, then compile with a bounded program size.
pub fn compile_pattern(pattern: &str) -> Result<Regex, PatternError> {
    validate_pattern(pattern)?;
    RegexBuilder::new(pattern)
        .size_limit(COMPILED_SIZE_LIMIT)
        .build()
        .map_err(|e| PatternError::Invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_patterns() {
        assert!(validate_pattern("error").is_ok());
        assert!(validate_pattern("failed|error").is_ok());
        assert!(validate_pattern(r"^systemctl\s+status\s+").is_ok());
        assert!(validate_pattern(r"^cat\s+/var/log/").is_ok());
    }

    #[test]
    fn rejects_overlong_pattern() {
        let long = "a".repeat(MAX_PATTERN_LEN + 1);
        assert_eq!(
            validate_pattern(&long),
            Err(PatternError::TooLong {
                len: MAX_PATTERN_LEN + 1,
                max: MAX_PATTERN_LEN
            })
        );
        assert!(validate_pattern(&"a".repeat(MAX_PATTERN_LEN)).is_ok());
    }

    #[test]
    fn rejects_nested_plus() {
        assert!(matches!(
            validate_pattern("(a+)+"),
            Err(PatternError::Dangerous { .. })
        ));
    }

    #[test]
    fn rejects_nested_star() {
        assert!(matches!(
            validate_pattern("(a*)*"),
            Err(PatternError::Dangerous { .. })
        ));
    }

    #[test]
    fn rejects_repeated_plus_chain() {
        assert!(validate_pattern(r"(\w+)+\w+").is_err());
        assert!(validate_pattern("(ab)+c+").is_err());
    }

    #[test]
    fn optional_group_is_fine() {
        assert!(validate_pattern(r"^journalctl(\s+-u\s+\w+)?$").is_ok());
    }

    #[test]
    fn compile_reports_syntax_errors() {
        assert!(matches!(
            compile_pattern("^df[\\s"),
            Err(PatternError::Invalid(_))
        ));
        assert!(compile_pattern(r"^df\s+").unwrap().is_match("df -h"));
    }
}
