//! Text normalization: punctuation stripping, stopword removal, and stemming.

pub mod stopwords;
pub mod tokenizer;

pub use tokenizer::{Token, Tokenizer};
