use crate::types::ChatEntry;

/// Escape text so it is never interpreted as markup when inserted as HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Split a broadcast line on the first `": "` into sender and text.
/// A line without the separator is all sender and no text.
pub fn split_sender(content: &str) -> (&str, &str) {
    content.split_once(": ").unwrap_or((content, ""))
}

/// HTML for one agent conversation entry. The content is always escaped.
pub fn agent_entry_markup(entry: &ChatEntry) -> String {
    format!(
        "<div class=\"{}\"><strong>{}:</strong> {}</div>",
        entry.author.css_class(),
        entry.author.label(),
        escape_html(&entry.content)
    )
}

/// HTML for one live chat line.
///
/// Sender and text are inserted as received, without escaping. The broker
/// escapes broadcast content before publishing it.
pub fn live_message_markup(content: &str) -> String {
    let (sender, text) = split_sender(content);
    format!(
        "<div class='message'><strong>{}:</strong> {}</div>",
        sender, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_covers_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_leaves_plain_text() {
        assert_eq!(escape_html("plain text, ok?"), "plain text, ok?");
    }

    #[test]
    fn test_agent_markup_has_no_active_tags_from_input() {
        let inputs = [
            "<script>alert(1)</script>",
            "<img src=x onerror=\"alert(1)\">",
            "a < b && c > d",
            "'quoted' \"double\"",
        ];
        for input in inputs {
            let markup = agent_entry_markup(&ChatEntry::user(input));
            let body = markup
                .strip_prefix("<div class=\"user-message\"><strong>You:</strong> ")
                .and_then(|rest| rest.strip_suffix("</div>"))
                .unwrap();
            assert!(!body.contains('<'), "{}", markup);
            assert!(!body.contains('>'), "{}", markup);
            assert!(!body.contains('"'), "{}", markup);
        }
    }

    #[test]
    fn test_agent_markup_labels_author() {
        let markup = agent_entry_markup(&ChatEntry::agent("hi"));
        assert_eq!(markup, "<div class=\"agent-message\"><strong>Agent:</strong> hi</div>");
    }

    #[test]
    fn test_split_sender_on_first_separator() {
        assert_eq!(split_sender("alice: hello there"), ("alice", "hello there"));
        assert_eq!(split_sender("alice: re: update"), ("alice", "re: update"));
    }

    #[test]
    fn test_split_sender_without_separator() {
        assert_eq!(split_sender("system"), ("system", ""));
        assert_eq!(split_sender("a:b"), ("a:b", ""));
    }

    #[test]
    fn test_live_markup_bolds_sender() {
        assert_eq!(
            live_message_markup("alice: hello there"),
            "<div class='message'><strong>alice:</strong> hello there</div>"
        );
    }

    #[test]
    fn test_live_markup_is_not_escaped() {
        let markup = live_message_markup("bob: <em>hi</em>");
        assert!(markup.contains("<em>hi</em>"));
    }
}
