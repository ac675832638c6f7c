//! Response sanitizer: whole-word brand substitution over completion output.
//!
//! Rules come from configuration as a table of `{pattern, replacement,
//! case_insensitive}` entries. Each pattern is escaped and anchored at
//! word boundaries, so substrings inside larger words are never touched.
//! Replacements are literal (`NoExpand`), so `$` in replacement text is
//! not treated as a capture reference.

use regex::{NoExpand, Regex, RegexBuilder};

use parley_types::config::SanitizerRule;

/// Compiled rewrite rule table.
///
/// Pure and deterministic: `sanitize` has no side effects, and for rule
/// sets whose replacements do not reintroduce source terms it is
/// idempotent.
pub struct Sanitizer {
    rules: Vec<CompiledRule>,
}

struct CompiledRule {
    matcher: Regex,
    replacement: String,
}

impl Sanitizer {
    /// Compile a rule table. Fails only on a pattern the regex engine
    /// rejects (patterns are escaped, so this means pathological sizes).
    pub fn new(rules: &[SanitizerRule]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|rule| {
                let pattern = format!(r"\b{}\b", regex::escape(&rule.pattern));
                let matcher = RegexBuilder::new(&pattern)
                    .case_insensitive(rule.case_insensitive)
                    .build()?;
                Ok(CompiledRule {
                    matcher,
                    replacement: rule.replacement.clone(),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// Rewrite all whole-word matches in `text`. Empty input yields
    /// empty output; text outside matched spans is preserved exactly.
    pub fn sanitize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            if let std::borrow::Cow::Owned(rewritten) =
                rule.matcher.replace_all(&out, NoExpand(&rule.replacement))
            {
                out = rewritten;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, replacement: &str, case_insensitive: bool) -> SanitizerRule {
        SanitizerRule {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            case_insensitive,
        }
    }

    #[test]
    fn test_rewrites_whole_words() {
        let sanitizer = Sanitizer::new(&[
            rule("Gemini", "Parley", false),
            rule("Google", "Parley Labs", false),
        ])
        .unwrap();

        assert_eq!(
            sanitizer.sanitize("Gemini says hi from Google"),
            "Parley says hi from Parley Labs"
        );
    }

    #[test]
    fn test_leaves_substrings_alone() {
        let sanitizer = Sanitizer::new(&[rule("Google", "Example", false)]).unwrap();
        // "Googleplex" is not a whole-word match.
        assert_eq!(sanitizer.sanitize("the Googleplex campus"), "the Googleplex campus");
        assert_eq!(sanitizer.sanitize("un-Google-like"), "un-Example-like");
    }

    #[test]
    fn test_case_insensitive_rule() {
        let sanitizer = Sanitizer::new(&[rule("gemini", "Parley", true)]).unwrap();
        assert_eq!(sanitizer.sanitize("GEMINI and Gemini and gemini"), "Parley and Parley and Parley");
    }

    #[test]
    fn test_case_sensitive_rule() {
        let sanitizer = Sanitizer::new(&[rule("Gemini", "Parley", false)]).unwrap();
        assert_eq!(sanitizer.sanitize("gemini stays, Gemini goes"), "gemini stays, Parley goes");
    }

    #[test]
    fn test_empty_input() {
        let sanitizer = Sanitizer::new(&[rule("a", "b", false)]).unwrap();
        assert_eq!(sanitizer.sanitize(""), "");
    }

    #[test]
    fn test_idempotent() {
        let sanitizer = Sanitizer::new(&[
            rule("Gemini", "Parley", true),
            rule("Google", "Parley Labs", true),
        ])
        .unwrap();

        let input = "Gemini says hi from Google, googleplex included";
        let once = sanitizer.sanitize(input);
        let twice = sanitizer.sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_preserves_surrounding_text() {
        let sanitizer = Sanitizer::new(&[rule("Gemini", "X", false)]).unwrap();
        assert_eq!(
            sanitizer.sanitize("  before\tGemini\nafter  "),
            "  before\tX\nafter  "
        );
    }

    #[test]
    fn test_dollar_in_replacement_is_literal() {
        let sanitizer = Sanitizer::new(&[rule("price", "$1", false)]).unwrap();
        assert_eq!(sanitizer.sanitize("the price today"), "the $1 today");
    }

    #[test]
    fn test_no_rules_is_identity() {
        let sanitizer = Sanitizer::new(&[]).unwrap();
        assert_eq!(sanitizer.sanitize("anything at all"), "anything at all");
    }
}
