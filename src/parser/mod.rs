//! Email parsing: input decoding, MIME structure, HTML stripping, and token extraction.

pub mod extract;
pub mod html;
pub mod mime;
pub mod raw;

pub use extract::{extract, EmailParser};
