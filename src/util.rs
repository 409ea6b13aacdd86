/// Keep alphanumerics, spaces, `-` and `_`; everything else becomes `_`.
/// Trailing whitespace is trimmed.
pub(crate) fn safe_file_name(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    mapped.trim_end().to_string()
}

/// Clip `text` to at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Handle of a channel URL (`@name`), used to group cached transcripts.
pub(crate) fn channel_handle(channel_url: &str) -> String {
    match channel_url.rsplit_once('@') {
        Some((_, rest)) => rest.split('/').next().unwrap_or_default().to_string(),
        None => "channel".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_file_names() {
        assert_eq!(safe_file_name("Rust: the Book / 2nd ed. "), "Rust_ the Book _ 2nd ed_");
        assert_eq!(safe_file_name("Café-Ünïcode_ok"), "Café-Ünïcode_ok");
        assert_eq!(safe_file_name("   "), "");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn extracts_channel_handle() {
        assert_eq!(channel_handle("https://www.youtube.com/@rustlang/videos"), "rustlang");
        assert_eq!(channel_handle("https://www.youtube.com/@rustlang"), "rustlang");
        assert_eq!(channel_handle("https://www.youtube.com/channel/UC123"), "channel");
    }
}
