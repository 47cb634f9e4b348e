//! `spamlens` — email spam classification with per-word explanations.
//!
//! This crate provides the core library for extracting text from raw
//! messages, tokenizing it, scoring it with a pre-trained linear model and
//! ranking the words that drove the decision.

pub mod classifier;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod predict;
pub mod text;
