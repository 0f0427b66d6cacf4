//! Offline fallback responses.
//!
//! When the relay is unreachable or signals `no_api_key`, the consumer
//! substitutes a deterministic canned reply so the conversation never ends
//! in a broken or empty state. The table is keyed on the literal text of
//! the last user turn (the quick-action labels), with a generic default for
//! everything else.

use riseva_core::MessageKind;

/// Default entry when the last user text matches no table row.
pub const DEFAULT_FALLBACK: &str =
    "Let me think about that and provide a helpful response...";

const EXPLAIN_DIFFERENTLY: &str = "Let me try a different approach! 🔄 Think of it like this:\n\n**Mitosis** is like a photocopy machine — you put in one page and get an exact copy. Both copies are identical.\n\n**Meiosis** is like shuffling a deck of cards and dealing 4 hands — each hand is unique and has only half the cards.\n\nDoes that analogy help? What part would you like to explore more?";

const GIVE_ME_A_HINT: &str = "💡 Here's a hint: Think about what happens at **fertilization**. If a sperm (from meiosis) meets an egg (from meiosis), and each has 23 chromosomes... what happens to the chromosome count in the resulting embryo?\n\nThis might help you understand *why* meiosis needs to halve the number!";

const PRACTICE_PROBLEM: &str = "📝 Here's a practice problem:\n\n**A plant cell has 24 chromosomes. A student claims that after meiosis, the resulting cells would each have 12 chromosomes, and after mitosis, they'd have 24.**\n\n**Is the student correct about both claims?** Explain your reasoning for each.";

const WHY_IMPORTANT: &str = "Great question! 🌍 Understanding cell division is fundamental because:\n\n1. **Mitosis** is how your body **grows and repairs** — every time you heal a cut, mitosis is happening\n2. **Meiosis** is how **genetic diversity** is created — it's why siblings aren't identical\n3. **Errors** in cell division can lead to conditions like **Down syndrome** (extra chromosome) or **cancer** (uncontrolled mitosis)\n\nThis connects to our next objective about division errors. Want to explore that?";

/// Canned reply for the given last user input; exact match or the default.
pub fn fallback_response(last_user_text: &str) -> &'static str {
    match last_user_text {
        "Explain differently" => EXPLAIN_DIFFERENTLY,
        "Give me a hint" => GIVE_ME_A_HINT,
        "Practice problem" => PRACTICE_PROBLEM,
        "Why is this important?" => WHY_IMPORTANT,
        _ => DEFAULT_FALLBACK,
    }
}

/// Display kind matching the quick-action that triggered the fallback.
pub fn fallback_kind(last_user_text: &str) -> MessageKind {
    match last_user_text {
        "Give me a hint" => MessageKind::Hint,
        "Practice problem" => MessageKind::Practice,
        _ => MessageKind::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_rows() {
        assert!(fallback_response("Give me a hint").contains("Here's a hint"));
        assert!(fallback_response("Practice problem").contains("practice problem"));
        assert!(fallback_response("Explain differently").contains("different approach"));
        assert!(fallback_response("Why is this important?").contains("fundamental"));
    }

    #[test]
    fn test_unknown_input_gets_default() {
        assert_eq!(fallback_response("what is mitosis"), DEFAULT_FALLBACK);
        // Near-misses do not match: the table is exact-match only.
        assert_eq!(fallback_response("give me a hint"), DEFAULT_FALLBACK);
    }

    #[test]
    fn test_every_entry_is_non_empty() {
        for input in [
            "Explain differently",
            "Give me a hint",
            "Practice problem",
            "Why is this important?",
            "anything else",
        ] {
            assert!(!fallback_response(input).is_empty());
        }
    }

    #[test]
    fn test_kinds_follow_quick_actions() {
        assert_eq!(fallback_kind("Give me a hint"), MessageKind::Hint);
        assert_eq!(fallback_kind("Practice problem"), MessageKind::Practice);
        assert_eq!(fallback_kind("anything"), MessageKind::Normal);
    }
}
