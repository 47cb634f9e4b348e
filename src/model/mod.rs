//! Core data model types: message trees, parsed emails, and prediction results.

pub mod email;
pub mod part;
pub mod prediction;
