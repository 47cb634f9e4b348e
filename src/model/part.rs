//! Structured representation of a message body as a tree of parts.

/// Declared content kind of a leaf part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `text/plain`
    Plain,
    /// `text/html`
    Html,
    /// Anything else (images, calendars, binary attachments, …).
    Other,
}

impl ContentKind {
    /// Map a `type/subtype` pair (case-insensitive) to a content kind.
    pub fn from_mime(ctype: &str, subtype: Option<&str>) -> Self {
        if !ctype.eq_ignore_ascii_case("text") {
            return Self::Other;
        }
        match subtype {
            Some(sub) if sub.eq_ignore_ascii_case("plain") => Self::Plain,
            Some(sub) if sub.eq_ignore_ascii_case("html") => Self::Html,
            _ => Self::Other,
        }
    }
}

/// One node of the message body tree.
///
/// The tree is resolved once while parsing, so extraction never has to
/// inspect payload types at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePart {
    /// A part carrying a decoded textual payload.
    Leaf { text: String, content_type: ContentKind },
    /// A container holding child parts in document order.
    Multipart { children: Vec<MessagePart> },
}

impl MessagePart {
    /// Shorthand for a `text/plain` leaf.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Leaf {
            text: text.into(),
            content_type: ContentKind::Plain,
        }
    }

    /// Shorthand for a `text/html` leaf.
    pub fn html(text: impl Into<String>) -> Self {
        Self::Leaf {
            text: text.into(),
            content_type: ContentKind::Html,
        }
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Multipart { children } => children.iter().map(Self::leaf_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_from_mime() {
        assert_eq!(ContentKind::from_mime("text", Some("plain")), ContentKind::Plain);
        assert_eq!(ContentKind::from_mime("TEXT", Some("HTML")), ContentKind::Html);
        assert_eq!(ContentKind::from_mime("text", Some("calendar")), ContentKind::Other);
        assert_eq!(ContentKind::from_mime("image", Some("png")), ContentKind::Other);
        assert_eq!(ContentKind::from_mime("text", None), ContentKind::Other);
    }

    #[test]
    fn test_leaf_count() {
        let tree = MessagePart::Multipart {
            children: vec![
                MessagePart::plain("a"),
                MessagePart::Multipart {
                    children: vec![MessagePart::html("<b>b</b>"), MessagePart::plain("c")],
                },
            ],
        };
        assert_eq!(tree.leaf_count(), 3);
    }
}
