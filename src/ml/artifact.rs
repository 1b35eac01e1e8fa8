//! Model artifacts
//!
//! One JSON file per model kind, produced by the training pipeline's export
//! step. Internal consistency (names vs. coefficients vs. scaler lengths) is
//! checked at load time so a corrupt file disables the model instead of
//! producing garbage predictions later.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Which classifier a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Url,
    Text,
    Hybrid,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Url, ModelKind::Text, ModelKind::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Url => "url",
            ModelKind::Text => "text",
            ModelKind::Hybrid => "hybrid",
        }
    }

    /// Artifact file name under the models directory.
    pub fn artifact_file(&self) -> &'static str {
        match self {
            ModelKind::Url => "url_model.json",
            ModelKind::Text => "text_model.json",
            ModelKind::Hybrid => "hybrid_model.json",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard-scaler parameters paired with the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// TF-IDF vectorizer state for text-aware models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfParams {
    /// term -> column index
    pub vocabulary: HashMap<String, usize>,
    /// idf weight per column
    pub idf: Vec<f64>,
}

/// A trained classifier plus its preprocessing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Feature names in the exact column order the model was trained with.
    pub feature_names: Vec<String>,
    /// Logistic-regression weights, one per feature.
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub scaler: ScalerParams,
    #[serde(default)]
    pub vectorizer: Option<TfidfParams>,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("inconsistent artifact: {0}")]
    Inconsistent(String),
}

impl ModelArtifact {
    /// Load and validate an artifact file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let content = std::fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&content)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check that every per-column list agrees on length.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(ArtifactError::Inconsistent("no features".to_string()));
        }
        if self.coefficients.len() != n {
            return Err(ArtifactError::Inconsistent(format!(
                "{} feature names but {} coefficients",
                n,
                self.coefficients.len()
            )));
        }
        if self.scaler.mean.len() != n || self.scaler.scale.len() != n {
            return Err(ArtifactError::Inconsistent(format!(
                "scaler lengths {}/{} do not match {} features",
                self.scaler.mean.len(),
                self.scaler.scale.len(),
                n
            )));
        }
        if let Some(v) = &self.vectorizer {
            if let Some(&max_idx) = v.vocabulary.values().max() {
                if max_idx >= v.idf.len() {
                    return Err(ArtifactError::Inconsistent(format!(
                        "vocabulary index {} out of range for {} idf weights",
                        max_idx,
                        v.idf.len()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }
}
