//! Keyword matching: first active rule whose keyword occurs in the message.
//!
//! Rules are checked in descending priority; equal priorities fall back to
//! ascending rule id so repeated runs over the same rule set always pick the
//! same rule. Matching is a case-insensitive substring test (not word-boundary)
//! against the trimmed message.

use serde::{Deserialize, Serialize};

/// One keyword rule: substring trigger and canned response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRule {
    pub id: u64,
    pub keyword: String,
    pub response: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Return the first active rule whose keyword occurs as a case-insensitive
/// substring of the message, or None when no rule matches.
///
/// Pure over its inputs: the rule slice is re-sorted internally (priority
/// desc, id asc), so callers do not have to pre-order it.
pub fn match_keyword<'a>(message: &str, rules: &'a [KeywordRule]) -> Option<&'a KeywordRule> {
    let message = message.trim().to_lowercase();
    if message.is_empty() {
        return None;
    }
    let mut ordered: Vec<&KeywordRule> = rules.iter().filter(|r| r.active).collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
    ordered
        .into_iter()
        .find(|r| !r.keyword.trim().is_empty() && message.contains(&r.keyword.trim().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: u64, keyword: &str, response: &str, priority: i32) -> KeywordRule {
        KeywordRule {
            id,
            keyword: keyword.to_string(),
            response: response.to_string(),
            priority,
            active: true,
        }
    }

    #[test]
    fn case_insensitive_substring() {
        let rules = vec![rule(1, "SALE", "50% off!", 0)];
        let hit = match_keyword("we have a sale today", &rules).expect("match");
        assert_eq!(hit.response, "50% off!");
    }

    #[test]
    fn higher_priority_wins_when_both_occur() {
        let rules = vec![
            rule(1, "price", "see the catalog", 1),
            rule(2, "sale", "50% off!", 10),
        ];
        let hit = match_keyword("what is the sale price?", &rules).expect("match");
        assert_eq!(hit.id, 2);
    }

    #[test]
    fn equal_priority_breaks_ties_by_id() {
        let rules = vec![
            rule(7, "hello", "hi from seven", 5),
            rule(3, "hello", "hi from three", 5),
        ];
        let hit = match_keyword("hello there", &rules).expect("match");
        assert_eq!(hit.id, 3);
    }

    #[test]
    fn deterministic_over_repeated_calls() {
        let rules = vec![
            rule(1, "ship", "ships in 2 days", 0),
            rule(2, "shipping", "free shipping", 0),
        ];
        let first = match_keyword("shipping cost?", &rules).map(|r| r.id);
        for _ in 0..10 {
            assert_eq!(match_keyword("shipping cost?", &rules).map(|r| r.id), first);
        }
    }

    #[test]
    fn inactive_rules_are_skipped() {
        let mut r = rule(1, "sale", "50% off!", 10);
        r.active = false;
        let rules = vec![r, rule(2, "sale", "active answer", 0)];
        let hit = match_keyword("sale?", &rules).expect("match");
        assert_eq!(hit.id, 2);
    }

    #[test]
    fn no_match_is_none() {
        let rules = vec![rule(1, "sale", "50% off!", 0)];
        assert!(match_keyword("do you open on sunday?", &rules).is_none());
    }
}
