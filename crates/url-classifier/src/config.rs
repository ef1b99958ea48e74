// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for model artifacts
//!
//! This module handles loading the versioned model registry from YAML and
//! resolving which vectorizer/classifier artifact pair the service runs with.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::{
    error::{ModelLoadError, ModelLoadResult},
    types::ModelVersion,
};

/// Paths of one fitted vectorizer/classifier pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    /// Fitted vectorizer artifact
    pub vectorizer: PathBuf,
    /// Fitted classifier artifact
    pub classifier: PathBuf,
}

impl ArtifactPaths {
    /// Create a new artifact pair
    pub fn new(vectorizer: impl Into<PathBuf>, classifier: impl Into<PathBuf>) -> Self {
        Self {
            vectorizer: vectorizer.into(),
            classifier: classifier.into(),
        }
    }

    /// Resolve relative paths against `base`
    fn resolved_against(&self, base: &Path) -> Self {
        Self {
            vectorizer: base.join(&self.vectorizer),
            classifier: base.join(&self.classifier),
        }
    }
}

/// Model registry configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRegistry {
    /// Artifact pairs by model version
    pub model_registry: BTreeMap<String, ArtifactPaths>,
    /// Directory relative artifact paths resolve against
    #[serde(skip)]
    base_dir: PathBuf,
}

impl ModelRegistry {
    /// Load model registry from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> ModelLoadResult<Self> {
        let path = path.as_ref();
        debug!("Loading model registry from: {}", path.display());

        let content = fs::read_to_string(path).await.map_err(|e| {
            ModelLoadError::io(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut registry: ModelRegistry = serde_yaml::from_str(&content).map_err(|e| {
            ModelLoadError::yaml(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        registry.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        info!(
            "Loaded model registry with {} versions from {}",
            registry.model_registry.len(),
            path.display()
        );

        Ok(registry)
    }

    /// Validate version names and artifact paths
    pub fn validate(&self) -> ModelLoadResult<()> {
        if self.model_registry.is_empty() {
            return Err(ModelLoadError::registry("No model versions configured"));
        }

        for (version, paths) in &self.model_registry {
            ModelVersion::new(version.clone()).map_err(|e| {
                ModelLoadError::registry(format!("Invalid version '{version}': {e}"))
            })?;

            if paths.vectorizer.as_os_str().is_empty() {
                return Err(ModelLoadError::registry(format!(
                    "Empty vectorizer path for version '{version}'"
                )));
            }

            if paths.classifier.as_os_str().is_empty() {
                return Err(ModelLoadError::registry(format!(
                    "Empty classifier path for version '{version}'"
                )));
            }
        }

        Ok(())
    }

    /// Get the artifact pair for a version, with paths resolved against the registry file
    pub fn get_artifacts(&self, version: &ModelVersion) -> ModelLoadResult<ArtifactPaths> {
        self.model_registry
            .get(version.as_str())
            .map(|paths| paths.resolved_against(&self.base_dir))
            .ok_or_else(|| {
                ModelLoadError::registry(format!("Version '{version}' not found"))
            })
    }

    /// Get all available versions
    pub fn get_versions(&self) -> ModelLoadResult<Vec<ModelVersion>> {
        self.model_registry
            .keys()
            .map(|s| ModelVersion::new(s.clone()))
            .collect()
    }

    /// Check if a version exists in the registry
    pub fn has_version(&self, version: &ModelVersion) -> bool {
        self.model_registry.contains_key(version.as_str())
    }
}

/// Where the inference context gets its models from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// A version looked up in a YAML registry
    Registry {
        /// Registry file
        path: PathBuf,
        /// Version to load
        version: ModelVersion,
    },
    /// An explicit artifact pair
    Files(ArtifactPaths),
}

impl ModelSource {
    /// Load `version` from the registry at `path`
    pub fn registry(path: impl Into<PathBuf>, version: ModelVersion) -> Self {
        Self::Registry {
            path: path.into(),
            version,
        }
    }

    /// Load an explicit artifact pair
    pub fn files(vectorizer: impl Into<PathBuf>, classifier: impl Into<PathBuf>) -> Self {
        Self::Files(ArtifactPaths::new(vectorizer, classifier))
    }

    /// Version label reported for models from this source
    pub fn version_label(&self) -> String {
        match self {
            ModelSource::Registry { version, .. } => version.to_string(),
            ModelSource::Files(_) => "unversioned".to_string(),
        }
    }

    /// Resolve to canonical, existing artifact paths
    pub async fn resolve(&self) -> ModelLoadResult<ArtifactPaths> {
        let paths = match self {
            ModelSource::Registry { path, version } => {
                let path = validate_and_canonicalize_path(path, "model registry")?;
                let registry = ModelRegistry::from_file(&path).await?;
                registry.validate()?;
                registry.get_artifacts(version)?
            }
            ModelSource::Files(paths) => paths.clone(),
        };

        Ok(ArtifactPaths {
            vectorizer: validate_and_canonicalize_path(&paths.vectorizer, "vectorizer")?,
            classifier: validate_and_canonicalize_path(&paths.classifier, "classifier")?,
        })
    }
}

/// Validate and canonicalize a file path
fn validate_and_canonicalize_path(path: &Path, file_type: &str) -> ModelLoadResult<PathBuf> {
    if !path.exists() {
        return Err(ModelLoadError::config(format!(
            "{} file not found: {} (current working directory: {})",
            file_type,
            path.display(),
            std::env::current_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "unknown".to_string())
        )));
    }

    if !path.is_file() {
        return Err(ModelLoadError::config(format!(
            "{} path exists but is not a file: {}",
            file_type,
            path.display()
        )));
    }

    path.canonicalize().map_err(|e| {
        ModelLoadError::config(format!(
            "Failed to canonicalize {} path {}: {}",
            file_type,
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tokio::fs::write;

    use super::*;

    async fn create_test_registry() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("models.yaml");

        let content = r#"
model_registry:
  latest:
    vectorizer: tfidf_vectorizer.json
    classifier: mnb_tfidf.json
  v1:
    vectorizer: v1/tfidf_vectorizer.json
    classifier: v1/mnb_tfidf.json
"#;

        write(&file_path, content).await.unwrap();
        write(temp_dir.path().join("tfidf_vectorizer.json"), "{}")
            .await
            .unwrap();
        write(temp_dir.path().join("mnb_tfidf.json"), "{}")
            .await
            .unwrap();
        (temp_dir, file_path)
    }

    #[tokio::test]
    async fn load_model_registry() {
        let (temp_dir, file_path) = create_test_registry().await;
        let registry = ModelRegistry::from_file(&file_path).await.unwrap();
        registry.validate().unwrap();

        assert_eq!(registry.model_registry.len(), 2);
        assert!(registry.has_version(&ModelVersion::latest()));
        assert!(!registry.has_version(&ModelVersion::new("v2").unwrap()));

        let paths = registry
            .get_artifacts(&ModelVersion::new("v1").unwrap())
            .unwrap();
        assert_eq!(
            paths.vectorizer,
            temp_dir.path().join("v1/tfidf_vectorizer.json")
        );

        let versions = registry.get_versions().unwrap();
        assert_eq!(versions.len(), 2);
    }

    #[tokio::test]
    async fn missing_version() {
        let (_temp_dir, file_path) = create_test_registry().await;
        let registry = ModelRegistry::from_file(&file_path).await.unwrap();

        let err = registry
            .get_artifacts(&ModelVersion::new("v9").unwrap())
            .unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("Version 'v9' not found"));
    }

    #[tokio::test]
    async fn registry_validation() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("models.yaml");

        write(&file_path, "model_registry: {}\n").await.unwrap();
        let registry = ModelRegistry::from_file(&file_path).await.unwrap();
        assert!(registry.validate().is_err());

        write(
            &file_path,
            "model_registry:\n  newest:\n    vectorizer: a.json\n    classifier: b.json\n",
        )
        .await
        .unwrap();
        let registry = ModelRegistry::from_file(&file_path).await.unwrap();
        let err = registry.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid version 'newest'"));

        write(&file_path, "model_registry: [not, a, map]\n")
            .await
            .unwrap();
        let err = ModelRegistry::from_file(&file_path).await.unwrap_err();
        assert!(matches!(err, ModelLoadError::Yaml { .. }));
    }

    #[tokio::test]
    async fn resolve_registry_source() {
        let (temp_dir, file_path) = create_test_registry().await;

        let source = ModelSource::registry(&file_path, ModelVersion::latest());
        assert_eq!(source.version_label(), "latest");

        let paths = source.resolve().await.unwrap();
        assert!(paths.vectorizer.is_absolute());
        assert!(paths.classifier.ends_with("mnb_tfidf.json"));

        // v1 is registered but its files do not exist
        let source = ModelSource::registry(&file_path, ModelVersion::new("v1").unwrap());
        let err = source.resolve().await.unwrap_err();
        assert!(err.to_string().contains("vectorizer file not found"));

        drop(temp_dir);
    }

    #[tokio::test]
    async fn resolve_file_source() {
        let (temp_dir, _file_path) = create_test_registry().await;

        let source = ModelSource::files(
            temp_dir.path().join("tfidf_vectorizer.json"),
            temp_dir.path().join("mnb_tfidf.json"),
        );
        assert_eq!(source.version_label(), "unversioned");
        assert!(source.resolve().await.is_ok());

        let source = ModelSource::files(
            temp_dir.path().join("tfidf_vectorizer.json"),
            temp_dir.path().join("missing.json"),
        );
        assert!(source.resolve().await.is_err());
    }

    #[test]
    fn file_validation() {
        let result =
            validate_and_canonicalize_path(Path::new("/non/existent/file.yaml"), "test");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("test file not found")
        );

        let temp_dir = TempDir::new().unwrap();
        let result = validate_and_canonicalize_path(temp_dir.path(), "test");
        assert!(result.unwrap_err().to_string().contains("is not a file"));

        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let canonical_path = validate_and_canonicalize_path(temp_file.path(), "test").unwrap();
        assert!(canonical_path.is_absolute());
        assert!(canonical_path.exists());
    }
}
