//! Prompt Builder
//!
//! Combines the fixed scope policy with whatever catalog context the selector
//! produced.

/// Refusal-and-scope policy sent with every request
pub const SCOPE_POLICY: &str = "You are a friendly assistant for a small streaming catalog. \
Answer only questions about the titles in the catalog data provided below, using only \
the facts given there (title, year, genre, director, rating and summary). \
If no catalog data is provided, or the question is about anything outside it, politely \
reply that you can only help with titles in this catalog. \
Never invent titles, ratings, cast members or plot details.";

/// Label introducing the catalog block
pub const CATALOG_DATA_LABEL: &str = "CATALOG DATA:";

/// Build the system instruction for a request.
///
/// `context` is the selector output; an empty context leaves the policy as is.
#[must_use]
pub fn build_system_instruction(context: &str) -> String {
    if context.is_empty() {
        return SCOPE_POLICY.to_string();
    }
    format!("{SCOPE_POLICY}\n\n{CATALOG_DATA_LABEL}\n{context}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::context::select_context;

    #[test]
    fn test_empty_context_leaves_policy_unmodified() {
        assert_eq!(build_system_instruction(""), SCOPE_POLICY);
        assert!(!build_system_instruction("").contains(CATALOG_DATA_LABEL));
    }

    #[test]
    fn test_context_is_appended_under_label() {
        let instruction = build_system_instruction("[{\"title\":\"Inception\"}]");
        assert!(instruction.starts_with(SCOPE_POLICY));
        assert!(instruction.ends_with("CATALOG DATA:\n[{\"title\":\"Inception\"}]"));
    }

    #[test]
    fn test_block_present_iff_selector_matched() {
        let catalog = Catalog::builtin();
        for (query, expect_block) in [
            ("what is queen's gambit about", true),
            ("recommend a drama", true),
            ("what is the capital of France?", false),
        ] {
            let instruction = build_system_instruction(&select_context(query, &catalog));
            assert_eq!(
                instruction.contains(CATALOG_DATA_LABEL),
                expect_block,
                "query: {query}"
            );
        }
    }
}
