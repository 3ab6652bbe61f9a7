//! Text helpers shared by the dispatcher and the Telegram transport.

/// Truncate a string to at most `max_chars` characters (not bytes).
///
/// # Examples
///
/// ```
/// use links_menu_bot::utils::truncate_str;
/// assert_eq!(truncate_str("Привет, мир!", 6), "Привет");
/// ```
#[must_use]
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Split a message into parts of at most `max_chars` characters.
///
/// Cuts after a newline when possible and inside a line only when the line
/// alone is longer than the limit. Concatenating the parts yields the input
/// unchanged.
///
/// # Examples
///
/// ```
/// use links_menu_bot::utils::split_message;
/// let long_msg = "A very long message...\n".repeat(300);
/// let parts = split_message(&long_msg, 4000);
/// assert!(parts.len() > 1);
/// assert_eq!(parts.concat(), long_msg);
/// ```
#[must_use]
pub fn split_message(message: &str, max_chars: usize) -> Vec<String> {
    if message.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for line in message.split_inclusive('\n') {
        let line_chars = line.chars().count();

        if current_chars + line_chars > max_chars && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if line_chars > max_chars {
            for ch in line.chars() {
                if current_chars == max_chars {
                    parts.push(std::mem::take(&mut current));
                    current_chars = 0;
                }
                current.push(ch);
                current_chars += 1;
            }
        } else {
            current.push_str(line);
            current_chars += line_chars;
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_unicode() {
        let s = "Привет, мир!";
        assert_eq!(truncate_str(s, 6), "Привет");
        assert_eq!(truncate_str(s, 50), "Привет, мир!");
    }

    #[test]
    fn test_split_short_message_is_untouched() {
        assert_eq!(split_message("hello", 10), vec!["hello".to_string()]);
        assert!(split_message("", 10).is_empty());
    }

    #[test]
    fn test_split_prefers_line_boundaries() {
        let parts = split_message("aaaa\nbbbb\ncccc", 10);
        assert_eq!(parts, vec!["aaaa\nbbbb\n".to_string(), "cccc".to_string()]);
    }

    #[test]
    fn test_split_long_line_by_chars() {
        let line = "ж".repeat(25);
        let parts = split_message(&line, 10);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.chars().count() <= 10));
        assert_eq!(parts.concat(), line);
    }

    #[test]
    fn test_split_keeps_content_verbatim() {
        let message = format!("intro\n{}\noutro\n\n", "x".repeat(23));
        let parts = split_message(&message, 8);
        assert!(parts.iter().all(|p| p.chars().count() <= 8));
        assert_eq!(parts.concat(), message);
    }
}
