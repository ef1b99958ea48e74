// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Reading fitted model artifacts from disk
//!
//! Artifacts are JSON documents exported from the training environment. Each
//! one carries a `format_version` and a `kind` so that a vectorizer file can
//! never be loaded as a classifier and a future, incompatible export format
//! is rejected instead of misread.

use std::path::Path;

use semver::Version;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::debug;

use crate::error::{ModelLoadError, ModelLoadResult};

/// Artifact format major version this crate understands
pub const SUPPORTED_FORMAT_MAJOR: u64 = 1;

/// Artifact kind of a fitted TF-IDF vectorizer
pub const TFIDF_VECTORIZER_KIND: &str = "tfidf_vectorizer";

/// Artifact kind of a fitted multinomial naive Bayes classifier
pub const MULTINOMIAL_NB_KIND: &str = "multinomial_nb";

/// Check the `format_version` and `kind` fields shared by every artifact
pub(crate) fn check_header(
    format_version: &str,
    kind: &str,
    expected_kind: &str,
) -> ModelLoadResult<Version> {
    let version = Version::parse(format_version).map_err(|e| {
        ModelLoadError::artifact(format!(
            "invalid format_version '{format_version}': {e}"
        ))
    })?;

    if version.major != SUPPORTED_FORMAT_MAJOR {
        return Err(ModelLoadError::artifact(format!(
            "unsupported format_version {version} (supported: {SUPPORTED_FORMAT_MAJOR}.x)"
        )));
    }

    if kind != expected_kind {
        return Err(ModelLoadError::artifact(format!(
            "expected artifact kind '{expected_kind}', found '{kind}'"
        )));
    }

    Ok(version)
}

/// Read and deserialize a JSON artifact
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> ModelLoadResult<T> {
    debug!("Reading model artifact from: {}", path.display());

    let content = fs::read_to_string(path).await.map_err(|e| {
        ModelLoadError::io(format!("Failed to read {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        ModelLoadError::json(format!("Failed to parse {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_accepts_supported_versions() {
        let version = check_header("1.0.0", "multinomial_nb", MULTINOMIAL_NB_KIND).unwrap();
        assert_eq!(version, Version::new(1, 0, 0));
        assert!(check_header("1.4.2", "tfidf_vectorizer", TFIDF_VECTORIZER_KIND).is_ok());
    }

    #[test]
    fn header_rejects_bad_versions() {
        let err = check_header("2.0.0", "multinomial_nb", MULTINOMIAL_NB_KIND).unwrap_err();
        assert!(err.to_string().contains("unsupported format_version"));

        let err = check_header("1.0", "multinomial_nb", MULTINOMIAL_NB_KIND).unwrap_err();
        assert!(err.to_string().contains("invalid format_version"));
    }

    #[test]
    fn header_rejects_wrong_kind() {
        let err = check_header("1.0.0", "tfidf_vectorizer", MULTINOMIAL_NB_KIND).unwrap_err();
        assert!(matches!(err, ModelLoadError::Artifact { .. }));
        assert!(err.to_string().contains("expected artifact kind 'multinomial_nb'"));
    }

    #[tokio::test]
    async fn read_missing_file() {
        let err = read_json::<serde_json::Value>(Path::new("/non/existent/model.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelLoadError::Io { .. }));
        assert!(err.to_string().contains("/non/existent/model.json"));
    }

    #[tokio::test]
    async fn read_malformed_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        tokio::fs::write(file.path(), "{ not json").await.unwrap();

        let err = read_json::<serde_json::Value>(file.path()).await.unwrap_err();
        assert!(matches!(err, ModelLoadError::Json { .. }));
    }
}
