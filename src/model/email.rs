//! Token streams extracted from one message.

use crate::text::Token;

/// The tokenized content of a single message.
///
/// `all_tokens` is always the subject tokens followed by the body tokens.
/// Built once per message and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEmail {
    subject_tokens: Vec<Token>,
    body_tokens: Vec<Token>,
    content_type: String,
    all_tokens: Vec<Token>,
}

impl ParsedEmail {
    /// Assemble a parsed email from its subject and body token streams.
    pub fn new(subject_tokens: Vec<Token>, body_tokens: Vec<Token>, content_type: String) -> Self {
        let mut all_tokens = Vec::with_capacity(subject_tokens.len() + body_tokens.len());
        all_tokens.extend_from_slice(&subject_tokens);
        all_tokens.extend_from_slice(&body_tokens);
        Self {
            subject_tokens,
            body_tokens,
            content_type,
            all_tokens,
        }
    }

    pub fn subject_tokens(&self) -> &[Token] {
        &self.subject_tokens
    }

    pub fn body_tokens(&self) -> &[Token] {
        &self.body_tokens
    }

    /// Top-level `type/subtype` of the message, lowercase.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn all_tokens(&self) -> &[Token] {
        &self.all_tokens
    }

    /// All tokens joined by single spaces, as fed to the vectorizer.
    pub fn joined_text(&self) -> String {
        self.all_tokens.join(" ")
    }
}
