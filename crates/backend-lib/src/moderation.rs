// ============================
// chatroom-backend-lib/src/moderation.rs
// ============================
//! Outbound text moderation.

/// Predicate applied to message text before it reaches a room
pub trait ContentPolicy: Send + Sync {
    /// Whether the text may be delivered
    fn allows(&self, text: &str) -> bool;
}

/// Rejects text containing any configured term, case-insensitively. An
/// empty deny list allows everything.
pub struct DenyListPolicy {
    terms: Vec<String>,
}

impl DenyListPolicy {
    pub fn new(terms: Vec<String>) -> Self {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

impl ContentPolicy for DenyListPolicy {
    fn allows(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        !self.terms.iter().any(|term| text.contains(term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_deny_list_allows_everything() {
        let policy = DenyListPolicy::new(Vec::new());
        assert!(policy.allows("anything at all"));
    }

    #[test]
    fn test_blocked_term_rejected_case_insensitively() {
        let policy = DenyListPolicy::new(vec!["spoilers".to_string()]);
        assert!(policy.allows("hello room"));
        assert!(!policy.allows("no SPOILERS please"));
    }

    #[test]
    fn test_blank_terms_are_ignored() {
        let policy = DenyListPolicy::new(vec!["  ".to_string()]);
        assert!(policy.allows("still fine"));
    }
}
