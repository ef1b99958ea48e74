// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Vectorizer adapter
//!
//! Maps a token string to a [`FeatureVector`] under a vocabulary frozen at
//! fitting time. The bundled implementation, [`TfidfVectorizer`], reproduces
//! the `transform` step of a fitted TF-IDF model: regex term extraction,
//! optional lowercasing, term counting, optional sublinear scaling, IDF
//! weighting and row normalization. Terms outside the vocabulary are ignored.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    fmt,
    path::Path,
};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    artifact::{self, TFIDF_VECTORIZER_KIND},
    error::{ClassifyResult, ModelLoadError, ModelLoadResult},
    types::FeatureVector,
};

/// Default term pattern: runs of two or more word characters
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Maps a token string to a fixed-dimension feature vector
#[cfg_attr(test, mockall::automock)]
pub trait Vectorize: Send + Sync + fmt::Debug {
    /// Vectorize a space-delimited token string
    fn vectorize(&self, tokens: &str) -> ClassifyResult<FeatureVector>;

    /// Dimension of every produced vector (vocabulary size)
    fn dimension(&self) -> usize;
}

/// Row normalization applied after weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    /// Divide by the sum of absolute values
    L1,
    /// Divide by the euclidean length
    L2,
}

#[allow(clippy::unnecessary_wraps)]
fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

/// Serialized form of a fitted TF-IDF vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfArtifact {
    /// Artifact format version (semver)
    pub format_version: String,
    /// Artifact kind, always `tfidf_vectorizer`
    pub kind: String,
    /// Lowercase documents before term extraction
    #[serde(default = "default_true")]
    pub lowercase: bool,
    /// Regex selecting terms; a single capture group selects the term within the match
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    /// Row normalization, `null` for none
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    /// Multiply term counts by IDF weights
    #[serde(default = "default_true")]
    pub use_idf: bool,
    /// Replace counts `tf` by `1 + ln(tf)`
    #[serde(default)]
    pub sublinear_tf: bool,
    /// Clamp counts to 1
    #[serde(default)]
    pub binary: bool,
    /// Term to column index
    pub vocabulary: HashMap<String, usize>,
    /// IDF weight per column
    pub idf: Vec<f64>,
}

/// Fitted TF-IDF vectorizer with a frozen vocabulary
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    pattern: Regex,
    use_capture_group: bool,
    lowercase: bool,
    norm: Option<Norm>,
    use_idf: bool,
    sublinear_tf: bool,
    binary: bool,
}

impl fmt::Debug for TfidfVectorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfidfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("token_pattern", &self.pattern.as_str())
            .field("lowercase", &self.lowercase)
            .field("norm", &self.norm)
            .field("use_idf", &self.use_idf)
            .field("sublinear_tf", &self.sublinear_tf)
            .field("binary", &self.binary)
            .finish()
    }
}

impl TfidfVectorizer {
    /// Load a fitted vectorizer from a JSON artifact file
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn from_file<P: AsRef<Path>>(path: P) -> ModelLoadResult<Self> {
        let path = path.as_ref();
        let artifact: TfidfArtifact = artifact::read_json(path).await?;
        let vectorizer = Self::from_artifact(artifact)
            .map_err(|e| ModelLoadError::artifact(format!("{}: {}", path.display(), e)))?;

        info!(
            "Loaded TF-IDF vectorizer with {} terms from {}",
            vectorizer.vocabulary.len(),
            path.display()
        );

        Ok(vectorizer)
    }

    /// Build a vectorizer from a deserialized artifact, validating it
    pub fn from_artifact(artifact: TfidfArtifact) -> ModelLoadResult<Self> {
        artifact::check_header(
            &artifact.format_version,
            &artifact.kind,
            TFIDF_VECTORIZER_KIND,
        )?;

        let pattern = Regex::new(&artifact.token_pattern).map_err(|e| {
            ModelLoadError::artifact(format!(
                "token_pattern '{}' does not compile: {}",
                artifact.token_pattern, e
            ))
        })?;

        // Group 0 is the whole match
        let use_capture_group = match pattern.captures_len() {
            1 => false,
            2 => true,
            n => {
                return Err(ModelLoadError::artifact(format!(
                    "token_pattern may contain at most one capture group, found {}",
                    n - 1
                )));
            }
        };

        if artifact.vocabulary.is_empty() {
            return Err(ModelLoadError::artifact("vocabulary is empty"));
        }

        let size = artifact.vocabulary.len();
        let mut seen = vec![false; size];
        for (term, &index) in &artifact.vocabulary {
            if index >= size {
                return Err(ModelLoadError::artifact(format!(
                    "term '{term}' has index {index}, outside vocabulary of size {size}"
                )));
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(ModelLoadError::artifact(format!(
                    "index {index} is assigned to more than one term"
                )));
            }
        }

        if artifact.use_idf {
            if artifact.idf.len() != size {
                return Err(ModelLoadError::artifact(format!(
                    "idf has {} weights for a vocabulary of {} terms",
                    artifact.idf.len(),
                    size
                )));
            }
            if let Some((index, weight)) = artifact
                .idf
                .iter()
                .enumerate()
                .find(|(_, w)| !w.is_finite() || **w <= 0.0)
            {
                return Err(ModelLoadError::artifact(format!(
                    "idf weight {weight} at index {index} must be finite and positive"
                )));
            }
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            pattern,
            use_capture_group,
            lowercase: artifact.lowercase,
            norm: artifact.norm,
            use_idf: artifact.use_idf,
            sublinear_tf: artifact.sublinear_tf,
            binary: artifact.binary,
        })
    }

    /// Column index of a vocabulary term
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Terms extracted from a document, in order, before vocabulary lookup
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let document: Cow<'_, str> = if self.lowercase {
            Cow::Owned(document.to_lowercase())
        } else {
            Cow::Borrowed(document)
        };

        if self.use_capture_group {
            self.pattern
                .captures_iter(&document)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                .collect()
        } else {
            self.pattern
                .find_iter(&document)
                .map(|m| m.as_str().to_string())
                .collect()
        }
    }

    fn normalize(&self, weights: &mut BTreeMap<usize, f64>) {
        let total = match self.norm {
            None => return,
            Some(Norm::L1) => weights.values().map(|v| v.abs()).sum::<f64>(),
            Some(Norm::L2) => weights.values().map(|v| v * v).sum::<f64>().sqrt(),
        };

        if total > 0.0 {
            for value in weights.values_mut() {
                *value /= total;
            }
        }
    }
}

impl Vectorize for TfidfVectorizer {
    fn vectorize(&self, tokens: &str) -> ClassifyResult<FeatureVector> {
        let mut weights: BTreeMap<usize, f64> = BTreeMap::new();
        let mut out_of_vocabulary = 0usize;

        for term in self.analyze(tokens) {
            match self.vocabulary.get(term.as_str()) {
                Some(&index) => *weights.entry(index).or_insert(0.0) += 1.0,
                None => out_of_vocabulary += 1,
            }
        }

        for (&index, value) in &mut weights {
            if self.binary {
                *value = 1.0;
            } else if self.sublinear_tf {
                *value = 1.0 + value.ln();
            }
            if self.use_idf {
                *value *= self.idf[index];
            }
        }

        self.normalize(&mut weights);

        debug!(
            in_vocabulary = weights.len(),
            out_of_vocabulary, "vectorized token string"
        );

        FeatureVector::new(
            self.vocabulary.len(),
            weights.into_iter().filter(|(_, v)| *v != 0.0).collect(),
        )
    }

    fn dimension(&self) -> usize {
        self.vocabulary.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(terms: &[&str], idf: Vec<f64>) -> TfidfArtifact {
        TfidfArtifact {
            format_version: "1.0.0".to_string(),
            kind: TFIDF_VECTORIZER_KIND.to_string(),
            lowercase: true,
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            norm: Some(Norm::L2),
            use_idf: true,
            sublinear_tf: false,
            binary: false,
            vocabulary: terms
                .iter()
                .enumerate()
                .map(|(i, t)| ((*t).to_string(), i))
                .collect(),
            idf,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_pattern_splits_hyphenated_hosts() {
        let vectorizer =
            TfidfVectorizer::from_artifact(artifact(&["paypal", "login"], vec![1.0, 1.0]))
                .unwrap();
        let terms = vectorizer.analyze("http:  Paypal-Login-secure badsite ru a");
        // single characters are not terms under the default pattern
        assert_eq!(
            terms,
            vec!["http", "paypal", "login", "secure", "badsite", "ru"]
        );
    }

    #[test]
    fn tfidf_l2_weights() {
        let vectorizer = TfidfVectorizer::from_artifact(artifact(
            &["example", "com", "home"],
            vec![2.0, 1.0, 1.5],
        ))
        .unwrap();

        let vector = vectorizer.vectorize("http:  example com home com").unwrap();
        assert_eq!(vector.dimension(), 3);
        assert_eq!(vector.nnz(), 3);

        // raw: example=2.0, com=2*1.0, home=1.5 -> length sqrt(4+4+2.25)
        let length = (4.0_f64 + 4.0 + 2.25).sqrt();
        assert!(approx(vector.get(0), 2.0 / length));
        assert!(approx(vector.get(1), 2.0 / length));
        assert!(approx(vector.get(2), 1.5 / length));
    }

    #[test]
    fn out_of_vocabulary_terms_are_ignored() {
        let vectorizer =
            TfidfVectorizer::from_artifact(artifact(&["example"], vec![1.0])).unwrap();

        let vector = vectorizer.vectorize("totally unknown words").unwrap();
        assert_eq!(vector.nnz(), 0);
        assert_eq!(vector.dimension(), 1);

        let vector = vectorizer.vectorize("").unwrap();
        assert_eq!(vector.nnz(), 0);
    }

    #[test]
    fn sublinear_binary_and_l1_options() {
        let mut a = artifact(&["aa", "bb"], vec![1.0, 1.0]);
        a.sublinear_tf = true;
        a.norm = None;
        let vectorizer = TfidfVectorizer::from_artifact(a).unwrap();
        let vector = vectorizer.vectorize("aa aa aa bb").unwrap();
        assert!(approx(vector.get(0), 1.0 + 3.0_f64.ln()));
        assert!(approx(vector.get(1), 1.0));

        let mut a = artifact(&["aa", "bb"], vec![1.0, 1.0]);
        a.binary = true;
        a.norm = Some(Norm::L1);
        let vectorizer = TfidfVectorizer::from_artifact(a).unwrap();
        let vector = vectorizer.vectorize("aa aa aa bb").unwrap();
        assert!(approx(vector.get(0), 0.5));
        assert!(approx(vector.get(1), 0.5));
    }

    #[test]
    fn case_is_kept_when_lowercase_disabled() {
        let mut a = artifact(&["Login"], vec![1.0]);
        a.lowercase = false;
        let vectorizer = TfidfVectorizer::from_artifact(a).unwrap();
        assert_eq!(vectorizer.vectorize("Login").unwrap().nnz(), 1);
        assert_eq!(vectorizer.vectorize("login").unwrap().nnz(), 0);
    }

    #[test]
    fn capture_group_selects_term() {
        let mut a = artifact(&["com"], vec![1.0]);
        a.token_pattern = r"\.(\w+)".to_string();
        let vectorizer = TfidfVectorizer::from_artifact(a).unwrap();
        let terms = vectorizer.analyze("example.com");
        assert_eq!(terms, vec!["com"]);
    }

    #[test]
    fn artifact_validation() {
        let mut a = artifact(&["aa", "bb"], vec![1.0]);
        let err = TfidfVectorizer::from_artifact(a.clone()).unwrap_err();
        assert!(err.to_string().contains("idf has 1 weights"));

        a.idf = vec![1.0, -1.0];
        assert!(TfidfVectorizer::from_artifact(a.clone()).is_err());

        a.idf = vec![1.0, 1.0];
        a.vocabulary.insert("bb".to_string(), 0);
        let err = TfidfVectorizer::from_artifact(a.clone()).unwrap_err();
        assert!(err.to_string().contains("more than one term"));

        let mut a = artifact(&["aa"], vec![1.0]);
        a.token_pattern = "(unclosed".to_string();
        assert!(TfidfVectorizer::from_artifact(a).is_err());

        let mut a = artifact(&["aa"], vec![1.0]);
        a.token_pattern = r"(\w)(\w)".to_string();
        let err = TfidfVectorizer::from_artifact(a).unwrap_err();
        assert!(err.to_string().contains("at most one capture group"));

        let mut a = artifact(&["aa"], vec![1.0]);
        a.kind = "multinomial_nb".to_string();
        assert!(TfidfVectorizer::from_artifact(a).is_err());

        assert!(TfidfVectorizer::from_artifact(artifact(&[], vec![])).is_err());
    }

    #[test]
    fn artifact_defaults() {
        let json = r#"{
            "format_version": "1.0.0",
            "kind": "tfidf_vectorizer",
            "vocabulary": {"login": 0},
            "idf": [1.0]
        }"#;
        let a: TfidfArtifact = serde_json::from_str(json).unwrap();
        assert!(a.lowercase);
        assert!(a.use_idf);
        assert!(!a.sublinear_tf);
        assert_eq!(a.norm, Some(Norm::L2));
        assert_eq!(a.token_pattern, DEFAULT_TOKEN_PATTERN);

        let json = r#"{
            "format_version": "1.0.0",
            "kind": "tfidf_vectorizer",
            "norm": null,
            "vocabulary": {"login": 0},
            "idf": [1.0]
        }"#;
        let a: TfidfArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(a.norm, None);
    }

    #[tokio::test]
    async fn load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tfidf_vectorizer.json");
        let json = serde_json::to_string(&artifact(&["login", "secure"], vec![1.0, 2.0])).unwrap();
        tokio::fs::write(&path, json).await.unwrap();

        let vectorizer = TfidfVectorizer::from_file(&path).await.unwrap();
        assert_eq!(vectorizer.dimension(), 2);
        assert_eq!(vectorizer.term_index("secure"), Some(1));
        assert!(format!("{vectorizer:?}").contains("vocabulary_size: 2"));
    }
}
