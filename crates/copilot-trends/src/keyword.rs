//! Keyword extraction.

use copilot_core::defaults;

const SENTENCE_TERMINATORS: [char; 5] = ['.', '?', '!', '\n', '\r'];

/// Cut a search keyword from free-text idea input.
///
/// Takes the text before the first sentence terminator or line break, keeps
/// at most the first six whitespace-separated words and joins them with
/// single spaces. Returns an empty string when nothing is left.
pub fn extract_keyword(prompt: &str) -> String {
    let first_sentence = prompt
        .split(SENTENCE_TERMINATORS)
        .next()
        .unwrap_or_default();

    first_sentence
        .split_whitespace()
        .take(defaults::KEYWORD_MAX_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_at_first_sentence() {
        assert_eq!(
            extract_keyword("Our app helps freelancers. It tracks invoices"),
            "Our app helps freelancers"
        );
    }

    #[test]
    fn test_caps_at_six_words() {
        assert_eq!(
            extract_keyword("a marketplace connecting local farmers with restaurants in the city"),
            "a marketplace connecting local farmers with"
        );
    }

    #[test]
    fn test_question_and_exclamation_terminate() {
        assert_eq!(extract_keyword("Need a CRM? For vets"), "Need a CRM");
        assert_eq!(extract_keyword("Drone delivery! Fast"), "Drone delivery");
    }

    #[test]
    fn test_line_break_terminates() {
        assert_eq!(extract_keyword("Pet insurance\nfor exotic animals"), "Pet insurance");
        assert_eq!(extract_keyword("Pet insurance\r\nfor reptiles"), "Pet insurance");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(extract_keyword("  vegan   meal\tkits  "), "vegan meal kits");
    }

    #[test]
    fn test_letter_n_is_not_a_terminator() {
        assert_eq!(extract_keyword("online tutoring"), "online tutoring");
    }

    #[test]
    fn test_empty_and_leading_terminator() {
        assert_eq!(extract_keyword(""), "");
        assert_eq!(extract_keyword(". trailing words"), "");
    }
}
