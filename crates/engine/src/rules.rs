//! Merchant-pattern rules for auto-categorization.
//!
//! A rule maps a merchant match pattern (with `*` as wildcard) to a category.
//! Matching is case-insensitive and Unicode-NFKC normalized so `UBER *EATS`
//! and `uber *eats` behave the same.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Priority assigned to rules created from the triage flow.
pub const DEFAULT_RULE_PRIORITY: i32 = 0;

/// A rule as it is about to be persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDraft {
    pub pattern: String,
    pub category_id: String,
    pub priority: i32,
    pub active: bool,
}

impl RuleDraft {
    /// Draft with the triage defaults: priority 0, active.
    pub fn new(pattern: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            category_id: category_id.into(),
            priority: DEFAULT_RULE_PRIORITY,
            active: true,
        }
    }
}

/// A persisted rule, used to pre-fill category suggestions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub pattern: String,
    pub category: String,
    pub priority: i32,
    pub active: bool,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            category: category.into(),
            priority: DEFAULT_RULE_PRIORITY,
            active: true,
        }
    }
}

/// NFKC + lowercase + collapsed whitespace, shared by patterns and labels.
fn normalize(value: &str) -> String {
    let folded: String = value.nfkc().collect::<String>().to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `merchant` matches `pattern`, treating `*` as "any run of
/// characters". Both sides are normalized before matching.
pub fn pattern_matches(pattern: &str, merchant: &str) -> bool {
    let pattern = normalize(pattern);
    let merchant = normalize(merchant);
    glob_match(&pattern.chars().collect::<Vec<_>>(), &merchant.chars().collect::<Vec<_>>())
}

// Iterative wildcard match with backtracking over the last `*`.
fn glob_match(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

/// Picks the winning rule for a merchant label.
///
/// Inactive rules are skipped. Lower priority wins; ties keep the earliest
/// rule in the given order.
pub fn first_match<'a>(rules: &'a [Rule], merchant: &str) -> Option<&'a Rule> {
    let mut best: Option<&Rule> = None;
    for rule in rules {
        if !rule.active || !pattern_matches(&rule.pattern, merchant) {
            continue;
        }
        match best {
            Some(current) if current.priority <= rule.priority => {}
            _ => best = Some(rule),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_pattern_matches_case_insensitively() {
        assert!(pattern_matches("NETFLIX", "netflix"));
        assert!(pattern_matches("uber *eats", "UBER *EATS"));
        assert!(!pattern_matches("NETFLIX", "SPOTIFY"));
    }

    #[test]
    fn wildcard_matches_any_run() {
        assert!(pattern_matches("AMZN*", "AMZN-19283"));
        assert!(pattern_matches("AMZN*", "amzn"));
        assert!(pattern_matches("*EATS", "UBER EATS"));
        assert!(pattern_matches("U*E*S", "UBER EATS"));
        assert!(!pattern_matches("AMZN*", "AMAZON"));
    }

    #[test]
    fn whitespace_is_collapsed_before_matching() {
        assert!(pattern_matches("UBER  EATS", "uber eats"));
        assert!(pattern_matches("uber eats", "UBER\tEATS"));
    }

    #[test]
    fn first_match_respects_priority_then_order() {
        let mut low = Rule::new("AMZN*", "Shopping");
        low.priority = 1;
        let high = Rule::new("AMZN*", "Subscriptions");
        let later = Rule::new("AMZN*", "Other");

        let rules = vec![low, high.clone(), later];
        let winner = first_match(&rules, "AMZN-19283");
        assert_eq!(winner.map(|r| r.category.as_str()), Some("Subscriptions"));
    }

    #[test]
    fn first_match_skips_inactive_rules() {
        let mut inactive = Rule::new("NETFLIX", "Entertainment");
        inactive.active = false;
        let rules = vec![inactive];
        assert!(first_match(&rules, "NETFLIX").is_none());
    }

    #[test]
    fn first_match_none_without_match() {
        let rules = vec![Rule::new("AMZN*", "Shopping")];
        assert!(first_match(&rules, "SPOTIFY").is_none());
    }
}
