//! Content extraction: message tree → ordered token stream.

use std::borrow::Cow;

use crate::config::Config;
use crate::error::{Result, SpamError};
use crate::model::email::ParsedEmail;
use crate::model::part::{ContentKind, MessagePart};
use crate::parser::html::strip_tags;
use crate::parser::mime;
use crate::text::{Token, Tokenizer};

/// Default upper bound on raw message size (10 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Collect the textual content of every plain-text and HTML leaf, depth-first.
///
/// HTML leaves are returned with their markup stripped. Leaves of any other
/// content type are skipped.
pub fn text_fragments(part: &MessagePart) -> Vec<Cow<'_, str>> {
    let mut fragments = Vec::new();
    collect_fragments(part, &mut fragments);
    fragments
}

fn collect_fragments<'a>(part: &'a MessagePart, out: &mut Vec<Cow<'a, str>>) {
    match part {
        MessagePart::Leaf {
            text,
            content_type: ContentKind::Plain,
        } => out.push(Cow::Borrowed(text)),
        MessagePart::Leaf {
            text,
            content_type: ContentKind::Html,
        } => out.push(Cow::Owned(strip_tags(text))),
        MessagePart::Leaf {
            content_type: ContentKind::Other,
            ..
        } => {}
        MessagePart::Multipart { children } => {
            for child in children {
                collect_fragments(child, out);
            }
        }
    }
}

/// Tokenize every textual leaf of `part` and concatenate the results in order.
pub fn extract(part: &MessagePart, tokenizer: &Tokenizer) -> Vec<Token> {
    text_fragments(part)
        .iter()
        .flat_map(|fragment| tokenizer.tokenize(fragment.as_ref()))
        .collect()
}

/// Turns raw message text into a [`ParsedEmail`].
#[derive(Debug)]
pub struct EmailParser {
    tokenizer: Tokenizer,
    max_message_size: usize,
}

impl EmailParser {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// English tokenizer plus the configured extra stopwords and size limit.
    pub fn from_config(config: &Config) -> Self {
        let tokenizer =
            Tokenizer::english().with_extra_stopwords(&config.tokenizer.extra_stopwords);
        Self::new(tokenizer).with_max_message_size(config.limits.max_message_size)
    }

    /// Reject raw messages larger than `limit` bytes.
    pub fn with_max_message_size(mut self, limit: usize) -> Self {
        self.max_message_size = limit;
        self
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Parse `raw` and tokenize its subject and body independently.
    ///
    /// The subject is never treated as HTML. Missing subject or body yields
    /// an empty token sequence for that side.
    pub fn parse(&self, raw: &str) -> Result<ParsedEmail> {
        if raw.len() > self.max_message_size {
            return Err(SpamError::MessageTooLarge {
                size: raw.len(),
                limit: self.max_message_size,
            });
        }

        let message = mime::parse_message(raw)?;
        let subject_tokens = self.tokenizer.tokenize(message.subject.as_deref());
        let body_tokens = extract(&message.body, &self.tokenizer);

        tracing::debug!(
            subject_tokens = subject_tokens.len(),
            body_tokens = body_tokens.len(),
            "Extracted tokens"
        );

        Ok(ParsedEmail::new(
            subject_tokens,
            body_tokens,
            message.content_type,
        ))
    }
}

impl Default for EmailParser {
    fn default() -> Self {
        Self::new(Tokenizer::english())
    }
}
