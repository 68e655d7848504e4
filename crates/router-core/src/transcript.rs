//! Transcript rendering and oracle-answer sanitation.
//!
//! Classifier prompts receive dialogue as plain `role: content` lines,
//! optionally annotated with `[topic:<id>]` so the resurfacing oracle can
//! answer with an id it was actually shown. Role names are already
//! normalized by the [`router_types::Role`] Display impl, so prompts are
//! agnostic of transport-layer naming.

use router_types::TaggedMessage;

/// Render messages as a transcript, one line per message.
///
/// With `with_topic_tags`, each line is prefixed with its topic tag:
/// `[topic:01ARZ...] user: I have a headache`.
pub fn format_dialogue(messages: &[TaggedMessage], with_topic_tags: bool) -> String {
    messages
        .iter()
        .map(|m| {
            if with_topic_tags {
                format!("[topic:{}] {}: {}", m.topic_id(), m.role(), m.content())
            } else {
                format!("{}: {}", m.role(), m.content())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The last `max` elements of a message slice.
pub fn tail(messages: &[TaggedMessage], max: usize) -> &[TaggedMessage] {
    let start = messages.len().saturating_sub(max);
    &messages[start..]
}

/// Strip matched wrapping quotes, repeatedly.
///
/// Oracles frequently echo labels as `"SAME_TOPIC"` or `'NEW_TOPIC'`.
pub fn strip_quotes(s: &str) -> &str {
    let mut s = s;
    while s.len() >= 2 {
        let bytes = s.as_bytes();
        let (first, last) = (bytes[0], bytes[s.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            s = &s[1..s.len() - 1];
        } else {
            break;
        }
    }
    s
}

/// Strip wrapping braces and brackets, balanced or dangling.
pub fn strip_braces(s: &str) -> &str {
    let mut s = s.trim();
    for (open, close) in [('{', '}'), ('[', ']')] {
        if s.starts_with(open) {
            s = s[open.len_utf8()..].trim_start();
        }
        if s.ends_with(close) {
            s = s[..s.len() - close.len_utf8()].trim_end();
        }
    }
    s.trim()
}

/// Normalize a raw oracle answer into a comparable label: trim, drop
/// wrapping braces and quotes, take the last non-empty line.
///
/// Taking the last line tolerates oracles that reason before answering.
pub fn sanitize_label(answer: &str) -> String {
    let line = answer
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    strip_quotes(strip_braces(line)).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_types::{Message, TopicId};

    fn tagged(content: &str, id: &TopicId) -> TaggedMessage {
        Message::user(content).tagged(id.clone())
    }

    #[test]
    fn test_format_dialogue_plain() {
        let id = TopicId::generate();
        let messages = vec![
            tagged("I have a headache", &id),
            Message::assistant("How long has it lasted?").tagged(id.clone()),
        ];
        let out = format_dialogue(&messages, false);
        assert_eq!(
            out,
            "user: I have a headache\nassistant: How long has it lasted?"
        );
    }

    #[test]
    fn test_format_dialogue_with_tags() {
        let id = TopicId::generate();
        let messages = vec![tagged("hello", &id)];
        let out = format_dialogue(&messages, true);
        assert_eq!(out, format!("[topic:{}] user: hello", id));
    }

    #[test]
    fn test_format_dialogue_empty() {
        assert_eq!(format_dialogue(&[], true), "");
    }

    #[test]
    fn test_tail() {
        let id = TopicId::generate();
        let messages: Vec<TaggedMessage> =
            (0..5).map(|i| tagged(&format!("m{}", i), &id)).collect();
        assert_eq!(tail(&messages, 2).len(), 2);
        assert_eq!(tail(&messages, 2)[0].content(), "m3");
        assert_eq!(tail(&messages, 10).len(), 5);
        assert_eq!(tail(&messages, 0).len(), 0);
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"NEW_TOPIC\""), "NEW_TOPIC");
        assert_eq!(strip_quotes("'\"nested\"'"), "nested");
        assert_eq!(strip_quotes("plain"), "plain");
        assert_eq!(strip_quotes("\"unbalanced"), "\"unbalanced");
        assert_eq!(strip_quotes(""), "");
    }

    #[test]
    fn test_strip_braces() {
        assert_eq!(strip_braces("{SAME_TOPIC}"), "SAME_TOPIC");
        assert_eq!(strip_braces("[id]"), "id");
        assert_eq!(strip_braces("{ [x] }"), "x");
        assert_eq!(strip_braces("{dangling"), "dangling");
        assert_eq!(strip_braces("plain"), "plain");
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("  \"SAME_TOPIC\"  "), "SAME_TOPIC");
        assert_eq!(sanitize_label("thinking...\nDIFFERENT_TOPIC"), "DIFFERENT_TOPIC");
        assert_eq!(sanitize_label("{'NEW_TOPIC'}"), "NEW_TOPIC");
        assert_eq!(sanitize_label(""), "");
        assert_eq!(sanitize_label("\n\n"), "");
    }
}
