//! Pre-trained classifier components and prediction explanation.
//!
//! The orchestrator only talks to [`Vectorizer`] and [`Classifier`]; the
//! JSON-backed [`CountVectorizer`] and [`LinearModel`] are the
//! implementations shipped with the crate.

pub mod artifacts;
pub mod linear;
pub mod rank;
pub mod sparse;
pub mod vectorizer;

pub use artifacts::ArtifactInfo;
pub use linear::LinearModel;
pub use rank::{rank, DEFAULT_TOP_N};
pub use sparse::FeatureVector;
pub use vectorizer::CountVectorizer;

use crate::error::Result;

/// Maps a whitespace-joined token stream to a sparse feature vector over a
/// fixed vocabulary.
///
/// Implementations must not mutate shared state in `transform`; one instance
/// serves concurrent requests.
pub trait Vectorizer: Send + Sync {
    fn transform(&self, text: &str) -> Result<FeatureVector>;

    /// Feature names, index-aligned with the vectors `transform` produces.
    fn feature_names(&self) -> &[String];
}

/// A fitted binary linear classifier.
pub trait Classifier: Send + Sync {
    /// The two class labels, in probability order.
    fn classes(&self) -> &[String];

    /// Predicted class label.
    fn predict(&self, features: &FeatureVector) -> Result<&str>;

    /// `[p(classes[0]), p(classes[1])]`.
    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2]>;

    /// One coefficient per feature, aligned with [`Vectorizer::feature_names`].
    fn coefficients(&self) -> &[f64];
}
