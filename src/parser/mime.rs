//! MIME parsing: raw message text → [`MessagePart`] tree.

use mail_parser::{Message, MessageParser, MimeHeaders, PartType};

use crate::error::{Result, SpamError};
use crate::model::part::{ContentKind, MessagePart};
use crate::parser::raw::skip_from_line;

/// Maximum nesting of multiparts and attached messages that is followed.
/// Deeper parts are dropped to keep adversarial input from exhausting the stack.
const MAX_DEPTH: usize = 32;

/// Content type reported when the message declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// A parsed message reduced to what the classifier needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MimeMessage {
    /// Decoded `Subject:` header, if present.
    pub subject: Option<String>,
    /// Top-level `type/subtype`, lowercase.
    pub content_type: String,
    /// Body tree rooted at the top-level part.
    pub body: MessagePart,
}

/// Parse a complete raw message (headers + body).
///
/// Uses `mail-parser` internally, falling back to a plain header/body split
/// when it gives up. Empty input and text that does not open with a header
/// field are a [`SpamError::MalformedMessage`].
pub fn parse_message(raw: &str) -> Result<MimeMessage> {
    let text = skip_from_line(raw);
    if text.trim().is_empty() {
        return Err(SpamError::MalformedMessage("message is empty".into()));
    }
    if !starts_with_header_field(text) {
        return Err(SpamError::MalformedMessage(
            "message has no header block".into(),
        ));
    }

    let Some(msg) = MessageParser::default().parse(text.as_bytes()) else {
        tracing::warn!("mail-parser could not parse message, using raw header/body split");
        return Ok(parse_fallback(text));
    };

    let content_type = msg
        .parts
        .first()
        .and_then(|root| root.content_type())
        .map(|ct| match ct.subtype() {
            Some(sub) => format!("{}/{}", ct.ctype(), sub),
            None => ct.ctype().to_string(),
        })
        .map(|ct| ct.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let body = build_part(&msg, 0, 0);
    tracing::debug!(
        content_type = %content_type,
        leaves = body.leaf_count(),
        "Parsed message structure"
    );

    Ok(MimeMessage {
        subject: msg.subject().map(String::from),
        content_type,
        body,
    })
}

/// Best-effort split for messages `mail-parser` rejects: the body is
/// everything after the first blank line, treated as plain text.
fn parse_fallback(text: &str) -> MimeMessage {
    let (headers, body) = split_header_body(text);
    let subject = headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("subject")
            .then(|| value.trim().to_string())
    });

    MimeMessage {
        subject,
        content_type: DEFAULT_CONTENT_TYPE.to_string(),
        body: MessagePart::plain(body),
    }
}

/// True if the first line is a `name: value` header field (RFC 5322 field
/// names are printable ASCII without spaces or colons).
fn starts_with_header_field(text: &str) -> bool {
    let first = text.lines().next().unwrap_or_default();
    match first.split_once(':') {
        Some((name, _)) => {
            !name.is_empty() && name.bytes().all(|b| b.is_ascii_graphic() && b != b':')
        }
        None => false,
    }
}

/// Split raw text at the first blank line.
fn split_header_body(text: &str) -> (&str, &str) {
    if let Some(pos) = text.find("\r\n\r\n") {
        if text.find("\n\n").map_or(true, |lf| lf > pos) {
            return (&text[..pos], &text[pos + 4..]);
        }
    }
    match text.find("\n\n") {
        Some(pos) => (&text[..pos], &text[pos + 2..]),
        None => (text, ""),
    }
}

/// Turn part `id` of `msg` (and everything below it) into a [`MessagePart`].
fn build_part(msg: &Message<'_>, id: usize, depth: usize) -> MessagePart {
    let Some(part) = msg.parts.get(id) else {
        return MessagePart::Multipart {
            children: Vec::new(),
        };
    };

    if depth > MAX_DEPTH {
        tracing::warn!(depth, "Message nesting too deep, ignoring remaining parts");
        return MessagePart::Multipart {
            children: Vec::new(),
        };
    }

    let kind = part
        .content_type()
        .map(|ct| ContentKind::from_mime(ct.ctype(), ct.subtype()));

    match &part.body {
        PartType::Multipart(ids) => MessagePart::Multipart {
            children: ids
                .iter()
                .filter(|&&child| child != id)
                .map(|&child| build_part(msg, child, depth + 1))
                .collect(),
        },
        PartType::Message(inner) => MessagePart::Multipart {
            children: vec![build_part(inner, 0, depth + 1)],
        },
        PartType::Text(text) => MessagePart::Leaf {
            text: text.to_string(),
            content_type: kind.unwrap_or(ContentKind::Plain),
        },
        PartType::Html(html) => MessagePart::Leaf {
            text: html.to_string(),
            content_type: kind.unwrap_or(ContentKind::Html),
        },
        PartType::Binary(bytes) | PartType::InlineBinary(bytes) => {
            let content_type = kind.unwrap_or(ContentKind::Other);
            let text = match content_type {
                ContentKind::Other => String::new(),
                _ => String::from_utf8_lossy(bytes).into_owned(),
            };
            MessagePart::Leaf { text, content_type }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_plain_message() {
        let raw = "From: a@example.com\nSubject: Hello there\n\nJust a body.\n";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.subject.as_deref(), Some("Hello there"));
        assert_eq!(msg.content_type, "text/plain");
        match msg.body {
            MessagePart::Leaf { text, content_type } => {
                assert_eq!(content_type, ContentKind::Plain);
                assert!(text.contains("Just a body."));
            }
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_multipart_alternative_order() {
        let raw = concat!(
            "Subject: Offer\n",
            "MIME-Version: 1.0\n",
            "Content-Type: multipart/alternative; boundary=\"XX\"\n",
            "\n",
            "--XX\n",
            "Content-Type: text/plain\n",
            "\n",
            "plain version\n",
            "--XX\n",
            "Content-Type: text/html\n",
            "\n",
            "<p>html version</p>\n",
            "--XX--\n",
        );
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.content_type, "multipart/alternative");
        let MessagePart::Multipart { children } = msg.body else {
            panic!("expected multipart");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(
            &children[0],
            MessagePart::Leaf { content_type: ContentKind::Plain, text } if text.contains("plain version")
        ));
        assert!(matches!(
            &children[1],
            MessagePart::Leaf { content_type: ContentKind::Html, text } if text.contains("<p>html version</p>")
        ));
    }

    #[test]
    fn test_encoded_subject_is_decoded() {
        let raw = "Subject: =?UTF-8?Q?Caf=C3=A9_gratis?=\n\nbody\n";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.subject.as_deref(), Some("Café gratis"));
    }

    #[test]
    fn test_mbox_separator_is_skipped() {
        let raw = "From someone@example.com Mon Jan 01 00:00:00 2024\nSubject: Hi\n\nBody\n";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.subject.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_split_header_body() {
        assert_eq!(split_header_body("A: b\n\nbody"), ("A: b", "body"));
        assert_eq!(split_header_body("A: b\r\n\r\nbody"), ("A: b", "body"));
        assert_eq!(split_header_body("A: b"), ("A: b", ""));
    }

    #[test]
    fn test_fallback_keeps_subject_and_body() {
        let msg = parse_fallback("Subject: Cheap meds\nX-Junk: 1\n\nbuy now\n");
        assert_eq!(msg.subject.as_deref(), Some("Cheap meds"));
        assert_eq!(msg.content_type, "text/plain");
        assert_eq!(msg.body, MessagePart::plain("buy now\n"));
    }

    #[test]
    fn test_text_without_headers_is_malformed() {
        for raw in [
            "Buy cheap pills now",
            "Buy cheap pills now\nlimited offer\n",
            "\nSubject: too late\n\nbody\n",
            "Act now: limited offer\n\nbody\n",
        ] {
            assert!(
                matches!(parse_message(raw), Err(SpamError::MalformedMessage(_))),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_header_field_detection() {
        assert!(starts_with_header_field("Subject: hi\n\nbody"));
        assert!(starts_with_header_field("X-Spam-Flag:YES\r\n"));
        assert!(!starts_with_header_field("Buy cheap pills now"));
        assert!(!starts_with_header_field(": no name\n"));
        assert!(!starts_with_header_field("Two words: value\n"));
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(matches!(
            parse_message(""),
            Err(SpamError::MalformedMessage(_))
        ));
        assert!(matches!(
            parse_message("  \n\t "),
            Err(SpamError::MalformedMessage(_))
        ));
    }
}
