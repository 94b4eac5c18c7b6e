use crate::config::TITLE_MAX_CHARS;
use crate::models::{Message, Role};

/// Title for a new conversation: the first user turn with text, or
/// `placeholder` if there is none.
pub fn derive_title(messages: &[Message], placeholder: &str) -> String {
    messages
        .iter()
        .filter(|m| m.role() == Some(Role::User))
        .find_map(|m| m.text_content())
        .map(truncate_title)
        .unwrap_or_else(|| placeholder.to_string())
}

/// Cut `text` to `TITLE_MAX_CHARS` characters, marking the cut with "...".
pub fn truncate_title(text: &str) -> String {
    match text.char_indices().nth(TITLE_MAX_CHARS) {
        Some((boundary, _)) => format!("{}...", &text[..boundary]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &str = "New conversation";

    #[test]
    fn test_title_from_first_user_turn() {
        let messages = vec![
            Message::assistant(1, "Xin chào!"),
            Message::user(2, ""),
            Message::user(3, "Cách làm phở bò"),
            Message::user(4, "và bánh mì"),
        ];
        assert_eq!(derive_title(&messages, PLACEHOLDER), "Cách làm phở bò");
    }

    #[test]
    fn test_placeholder_without_user_text() {
        let messages = vec![Message::assistant(1, "Hello")];
        assert_eq!(derive_title(&messages, PLACEHOLDER), PLACEHOLDER);
        assert_eq!(derive_title(&[], PLACEHOLDER), PLACEHOLDER);
    }

    #[test]
    fn test_truncate_at_fifty_chars() {
        let exact = "a".repeat(50);
        assert_eq!(truncate_title(&exact), exact);

        let long = "b".repeat(51);
        assert_eq!(truncate_title(&long), format!("{}...", "b".repeat(50)));
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let long = "ộ".repeat(60);
        let title = truncate_title(&long);
        assert_eq!(title.chars().count(), 53);
        assert!(title.ends_with("..."));
    }
}
