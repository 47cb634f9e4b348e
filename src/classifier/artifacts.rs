//! Loading pre-trained artifacts from disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use super::{Classifier, CountVectorizer, LinearModel, Vectorizer};
use crate::error::{Result, SpamError};

/// Identity of a loaded artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    /// "model" or "vectorizer".
    pub kind: String,
    pub path: PathBuf,
    /// Hex SHA-256 of the file contents.
    pub sha256: String,
    pub size: u64,
}

/// A vectorizer and model that agree with each other.
#[derive(Debug)]
pub struct Artifacts {
    pub vectorizer: CountVectorizer,
    pub model: LinearModel,
    pub info: Vec<ArtifactInfo>,
}

/// Load and cross-check the vectorizer and model.
///
/// Fails if either file is missing or invalid, if the coefficient count does
/// not match the vocabulary size, or if `positive_label` is not a model class.
pub fn load(vectorizer_path: &Path, model_path: &Path, positive_label: &str) -> Result<Artifacts> {
    let (vectorizer, vectorizer_info) = load_vectorizer(vectorizer_path)?;
    let (model, model_info) = load_model(model_path)?;

    if model.coefficients().len() != vectorizer.feature_names().len() {
        return Err(SpamError::invalid_artifact(
            model_path,
            format!(
                "model has {} coefficients but the vectorizer has {} features",
                model.coefficients().len(),
                vectorizer.feature_names().len()
            ),
        ));
    }

    if !model.classes().iter().any(|c| c == positive_label) {
        return Err(SpamError::invalid_artifact(
            model_path,
            format!(
                "positive label '{positive_label}' is not one of the model classes {:?}",
                model.classes()
            ),
        ));
    }

    Ok(Artifacts {
        vectorizer,
        model,
        info: vec![vectorizer_info, model_info],
    })
}

/// Load a [`CountVectorizer`] from a JSON file.
pub fn load_vectorizer(path: &Path) -> Result<(CountVectorizer, ArtifactInfo)> {
    let (json, info) = read_artifact(path, "vectorizer")?;
    let vectorizer = CountVectorizer::from_json(&json)
        .map_err(|e| SpamError::invalid_artifact(path, format!("{e:#}")))?;
    info!(
        path = %path.display(),
        features = vectorizer.len(),
        sha256 = %info.sha256,
        "Loaded vectorizer"
    );
    Ok((vectorizer, info))
}

/// Load a [`LinearModel`] from a JSON file.
pub fn load_model(path: &Path) -> Result<(LinearModel, ArtifactInfo)> {
    let (json, info) = read_artifact(path, "model")?;
    let model = LinearModel::from_json(&json)
        .map_err(|e| SpamError::invalid_artifact(path, format!("{e:#}")))?;
    info!(
        path = %path.display(),
        coefficients = model.coefficients().len(),
        classes = ?model.classes(),
        sha256 = %info.sha256,
        "Loaded model"
    );
    Ok((model, info))
}

fn read_artifact(path: &Path, kind: &str) -> Result<(String, ArtifactInfo)> {
    let bytes = std::fs::read(path).map_err(|e| SpamError::io(path, e))?;
    let info = ArtifactInfo {
        kind: kind.to_string(),
        path: path.to_path_buf(),
        sha256: sha256_hex(&bytes),
        size: bytes.len() as u64,
    };
    let json = String::from_utf8(bytes)
        .map_err(|_| SpamError::invalid_artifact(path, "file is not valid UTF-8"))?;
    Ok((json, info))
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_load_pair() {
        let dir = tempfile::tempdir().unwrap();
        let v = write(dir.path(), "v.json", r#"{"vocabulary": ["free", "meet"]}"#);
        let m = write(
            dir.path(),
            "m.json",
            r#"{"classes": ["ham", "spam"], "coefficients": [1.5, -2.0], "intercept": 0.1}"#,
        );
        let artifacts = load(&v, &m, "spam").unwrap();
        assert_eq!(artifacts.vectorizer.len(), 2);
        assert_eq!(artifacts.info.len(), 2);
        assert_eq!(artifacts.info[0].kind, "vectorizer");
        assert_eq!(artifacts.info[1].sha256.len(), 64);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let v = write(dir.path(), "v.json", r#"{"vocabulary": ["free"]}"#);
        let m = write(
            dir.path(),
            "m.json",
            r#"{"classes": ["ham", "spam"], "coefficients": [1.0, 2.0]}"#,
        );
        let err = load(&v, &m, "spam").unwrap_err();
        assert!(matches!(err, SpamError::InvalidArtifact { .. }));
    }

    #[test]
    fn test_positive_label_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let v = write(dir.path(), "v.json", r#"{"vocabulary": ["free"]}"#);
        let m = write(
            dir.path(),
            "m.json",
            r#"{"classes": ["ham", "spam"], "coefficients": [1.0]}"#,
        );
        assert!(load(&v, &m, "Spam").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SpamError::Io { .. }));
    }
}
