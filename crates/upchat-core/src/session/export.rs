//! Plain-text transcript export.

use super::message::{Message, Sender};

/// Renders messages as plain text, one speaker-prefixed paragraph per message.
///
/// Continuation lines of multi-line messages are indented under the speaker
/// label so the export stays readable when printed.
pub fn render_transcript(
    title: Option<&str>,
    messages: &[Message],
    user_label: &str,
    bot_label: &str,
) -> String {
    let mut out = String::new();
    if let Some(title) = title {
        out.push_str(title);
        out.push('\n');
        out.push_str(&"=".repeat(title.chars().count().max(3)));
        out.push_str("\n\n");
    }

    for message in messages {
        let label = match message.sender {
            Sender::User => user_label,
            Sender::Bot => bot_label,
        };
        let mut lines = message.text.lines();
        out.push_str(&format!("{}: {}\n", label, lines.next().unwrap_or("")));
        let indent = " ".repeat(label.chars().count() + 2);
        for line in lines {
            out.push_str(&indent);
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_title() {
        let messages = vec![
            Message::bot(1, "สวัสดีค่ะ"),
            Message::user(2, "hello"),
        ];
        let text = render_transcript(Some("hello (10:00)"), &messages, "Ann", "UP Chat");
        assert_eq!(
            text,
            "hello (10:00)\n=============\n\nUP Chat: สวัสดีค่ะ\nAnn: hello\n"
        );
    }

    #[test]
    fn test_multiline_is_indented() {
        let messages = vec![Message::bot(1, "line one\nline two")];
        let text = render_transcript(None, &messages, "You", "Bot");
        assert_eq!(text, "Bot: line one\n     line two\n");
    }
}
