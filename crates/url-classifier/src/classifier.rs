// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Classifier adapter
//!
//! Maps a [`FeatureVector`] to exactly one [`Label`]. [`MultinomialNb`] is a
//! fitted multinomial naive Bayes model: the predicted class maximizes
//! `class_log_prior[c] + x · feature_log_prob[c]`, ties going to the class
//! listed first.

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    artifact::{self, MULTINOMIAL_NB_KIND},
    error::{ClassifyError, ClassifyResult, ModelLoadError, ModelLoadResult},
    types::{FeatureVector, Label},
};

/// Maps a feature vector to a label
#[cfg_attr(test, mockall::automock)]
pub trait Classify: Send + Sync + fmt::Debug {
    /// Predict the label of a feature vector
    fn classify(&self, features: &FeatureVector) -> ClassifyResult<Label>;

    /// Number of features the model expects
    fn n_features(&self) -> usize;
}

/// Serialized form of a fitted multinomial naive Bayes classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNbArtifact {
    /// Artifact format version (semver)
    pub format_version: String,
    /// Artifact kind, always `multinomial_nb`
    pub kind: String,
    /// Class names in model order
    pub classes: Vec<String>,
    /// Log prior probability per class
    pub class_log_prior: Vec<f64>,
    /// Log probability of each feature given each class, one row per class
    pub feature_log_prob: Vec<Vec<f64>>,
}

/// Fitted multinomial naive Bayes classifier
pub struct MultinomialNb {
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
    n_features: usize,
}

impl fmt::Debug for MultinomialNb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultinomialNb")
            .field("classes", &self.classes)
            .field("n_features", &self.n_features)
            .finish()
    }
}

impl MultinomialNb {
    /// Load a fitted classifier from a JSON artifact file
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn from_file<P: AsRef<Path>>(path: P) -> ModelLoadResult<Self> {
        let path = path.as_ref();
        let artifact: MultinomialNbArtifact = artifact::read_json(path).await?;
        let classifier = Self::from_artifact(artifact)
            .map_err(|e| ModelLoadError::artifact(format!("{}: {}", path.display(), e)))?;

        info!(
            "Loaded naive Bayes classifier with classes {:?} over {} features from {}",
            classifier.classes,
            classifier.n_features,
            path.display()
        );

        Ok(classifier)
    }

    /// Build a classifier from a deserialized artifact, validating it
    pub fn from_artifact(artifact: MultinomialNbArtifact) -> ModelLoadResult<Self> {
        artifact::check_header(&artifact.format_version, &artifact.kind, MULTINOMIAL_NB_KIND)?;

        let n_classes = artifact.classes.len();
        if n_classes < 2 {
            return Err(ModelLoadError::artifact(format!(
                "classifier needs at least two classes, found {n_classes}"
            )));
        }

        if artifact.class_log_prior.len() != n_classes {
            return Err(ModelLoadError::artifact(format!(
                "class_log_prior has {} entries for {} classes",
                artifact.class_log_prior.len(),
                n_classes
            )));
        }

        if artifact.feature_log_prob.len() != n_classes {
            return Err(ModelLoadError::artifact(format!(
                "feature_log_prob has {} rows for {} classes",
                artifact.feature_log_prob.len(),
                n_classes
            )));
        }

        let n_features = artifact.feature_log_prob[0].len();
        if n_features == 0 {
            return Err(ModelLoadError::artifact("feature_log_prob rows are empty"));
        }

        for (class, row) in artifact.classes.iter().zip(&artifact.feature_log_prob) {
            if row.len() != n_features {
                return Err(ModelLoadError::artifact(format!(
                    "feature_log_prob row for class '{}' has {} features, expected {}",
                    class,
                    row.len(),
                    n_features
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ModelLoadError::artifact(format!(
                    "feature_log_prob row for class '{class}' contains non-finite values"
                )));
            }
        }

        if artifact.class_log_prior.iter().any(|v| !v.is_finite()) {
            return Err(ModelLoadError::artifact(
                "class_log_prior contains non-finite values",
            ));
        }

        // Unknown classes are tolerated here; predicting one fails the request instead
        let unknown: Vec<&str> = artifact
            .classes
            .iter()
            .filter(|c| c.parse::<Label>().is_err())
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            warn!(
                "Classifier classes {:?} are not 'good'/'bad'; predictions of them will fail",
                unknown
            );
        }

        Ok(Self {
            classes: artifact.classes,
            class_log_prior: artifact.class_log_prior,
            feature_log_prob: artifact.feature_log_prob,
            n_features,
        })
    }

    /// Class names in model order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Joint log-likelihood of each class for a feature vector
    pub fn joint_log_likelihood(&self, features: &FeatureVector) -> ClassifyResult<Vec<f64>> {
        if features.dimension() != self.n_features {
            return Err(ClassifyError::classification(format!(
                "feature vector has {} dimensions, model expects {}",
                features.dimension(),
                self.n_features
            )));
        }

        Ok(self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, row)| prior + features.dot(row))
            .collect())
    }
}

impl Classify for MultinomialNb {
    fn classify(&self, features: &FeatureVector) -> ClassifyResult<Label> {
        let scores = self.joint_log_likelihood(features)?;

        let mut best: Option<(usize, f64)> = None;
        for (index, &score) in scores.iter().enumerate() {
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((index, score));
            }
        }

        match best {
            Some((index, score)) if score.is_finite() => self.classes[index].parse(),
            _ => Err(ClassifyError::classification(
                "classifier produced no usable label",
            )),
        }
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> MultinomialNbArtifact {
        // features: [login, example]
        MultinomialNbArtifact {
            format_version: "1.0.0".to_string(),
            kind: MULTINOMIAL_NB_KIND.to_string(),
            classes: vec!["bad".to_string(), "good".to_string()],
            class_log_prior: vec![0.5_f64.ln(), 0.5_f64.ln()],
            feature_log_prob: vec![
                vec![0.9_f64.ln(), 0.1_f64.ln()],
                vec![0.1_f64.ln(), 0.9_f64.ln()],
            ],
        }
    }

    #[test]
    fn predicts_highest_likelihood_class() {
        let nb = MultinomialNb::from_artifact(artifact()).unwrap();
        assert_eq!(nb.n_features(), 2);

        let login = FeatureVector::from_dense(&[1.0, 0.0]).unwrap();
        assert_eq!(nb.classify(&login).unwrap(), Label::Bad);

        let example = FeatureVector::from_dense(&[0.0, 1.0]).unwrap();
        assert_eq!(nb.classify(&example).unwrap(), Label::Good);
    }

    #[test]
    fn ties_go_to_first_class() {
        let nb = MultinomialNb::from_artifact(artifact()).unwrap();
        let empty = FeatureVector::zeros(2);
        assert_eq!(nb.classify(&empty).unwrap(), Label::Bad);
    }

    #[test]
    fn joint_log_likelihood_values() {
        let nb = MultinomialNb::from_artifact(artifact()).unwrap();
        let features = FeatureVector::from_dense(&[2.0, 1.0]).unwrap();
        let jll = nb.joint_log_likelihood(&features).unwrap();
        let expected_bad = 0.5_f64.ln() + 2.0 * 0.9_f64.ln() + 0.1_f64.ln();
        assert!((jll[0] - expected_bad).abs() < 1e-12);
    }

    #[test]
    fn dimension_mismatch_is_classification_error() {
        let nb = MultinomialNb::from_artifact(artifact()).unwrap();
        let features = FeatureVector::zeros(3);
        let err = nb.classify(&features).unwrap_err();
        assert!(matches!(err, ClassifyError::Classification { .. }));
        assert!(err.to_string().contains("model expects 2"));
    }

    #[test]
    fn unknown_class_is_classification_error() {
        let mut a = artifact();
        a.classes = vec!["phishing".to_string(), "good".to_string()];
        let nb = MultinomialNb::from_artifact(a).unwrap();

        let login = FeatureVector::from_dense(&[1.0, 0.0]).unwrap();
        let err = nb.classify(&login).unwrap_err();
        assert!(matches!(err, ClassifyError::Classification { .. }));
        assert!(err.to_string().contains("phishing"));

        let example = FeatureVector::from_dense(&[0.0, 1.0]).unwrap();
        assert_eq!(nb.classify(&example).unwrap(), Label::Good);
    }

    #[test]
    fn artifact_validation() {
        let mut a = artifact();
        a.classes.pop();
        assert!(MultinomialNb::from_artifact(a).is_err());

        let mut a = artifact();
        a.class_log_prior.push(0.0);
        let err = MultinomialNb::from_artifact(a).unwrap_err();
        assert!(err.to_string().contains("class_log_prior has 3 entries"));

        let mut a = artifact();
        a.feature_log_prob[1].push(0.0);
        let err = MultinomialNb::from_artifact(a).unwrap_err();
        assert!(err.to_string().contains("row for class 'good'"));

        let mut a = artifact();
        a.feature_log_prob[0][0] = f64::NEG_INFINITY;
        assert!(MultinomialNb::from_artifact(a).is_err());

        let mut a = artifact();
        a.kind = "tfidf_vectorizer".to_string();
        assert!(MultinomialNb::from_artifact(a).is_err());
    }

    #[tokio::test]
    async fn load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mnb_tfidf.json");
        tokio::fs::write(&path, serde_json::to_string(&artifact()).unwrap())
            .await
            .unwrap();

        let nb = MultinomialNb::from_file(&path).await.unwrap();
        assert_eq!(nb.classes(), ["bad".to_string(), "good".to_string()]);
        assert!(format!("{nb:?}").contains("n_features: 2"));
    }
}
