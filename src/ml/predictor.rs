//! Predictor
//!
//! Extract features, align them to the model's column order, standard-scale,
//! and apply the logistic decision function. Deterministic given loaded
//! artifacts; a length mismatch between vector and weights is an internal
//! invariant violation and fails the request, never the process.

use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::features::whois::{self, WhoisConfig};
use crate::features::{text, url, FeatureSet};

use super::artifact::{ModelArtifact, ModelKind};
use super::registry::ModelRegistry;

/// Classifier verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Phishing,
    Legitimate,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Phishing => "Phishing",
            Label::Legitimate => "Legitimate",
        }
    }

    pub fn is_phishing(&self) -> bool {
        matches!(self, Label::Phishing)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable result of one classifier run.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub label: Label,
    /// Maximum class probability, in [0, 1].
    pub confidence: f64,
    pub model_kind: ModelKind,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("{0} model is not available")]
    ModelUnavailable(ModelKind),
    #[error("feature vector length {actual} does not match model width {expected}")]
    FeatureMismatch { expected: usize, actual: usize },
}

/// Applies loaded artifacts to raw input.
#[derive(Debug)]
pub struct Predictor {
    registry: Arc<ModelRegistry>,
    whois: WhoisConfig,
}

impl Predictor {
    pub fn new(registry: Arc<ModelRegistry>, whois: WhoisConfig) -> Self {
        Self { registry, whois }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Classify a URL with the URL model.
    pub fn predict_url(&self, input: &str) -> Result<Prediction, PredictError> {
        let artifact = self.artifact(ModelKind::Url)?;
        let features = url::extract(input);
        run(artifact, &features, ModelKind::Url)
    }

    /// Classify a text blob with the text model.
    pub fn predict_text(&self, input: &str) -> Result<Prediction, PredictError> {
        let artifact = self.artifact(ModelKind::Text)?;
        let mut features = text::extract(input);
        if let Some(vectorizer) = &artifact.vectorizer {
            features.merge(text::tfidf_features(input, vectorizer));
        }
        run(artifact, &features, ModelKind::Text)
    }

    /// Classify with the hybrid model: URL features, best-effort WHOIS
    /// features, and (when text is supplied) text features concatenated in
    /// the model's trained order.
    pub async fn predict_hybrid(
        &self,
        url_input: &str,
        text_input: Option<&str>,
    ) -> Result<Prediction, PredictError> {
        let artifact = self.artifact(ModelKind::Hybrid)?;

        let mut features = url::extract(url_input);

        let domain = ::url::Url::parse(url_input)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_default();
        whois::lookup(&domain, &self.whois)
            .await
            .write_into(&mut features);

        if let Some(text_input) = text_input {
            features.merge(text::extract(text_input));
            if let Some(vectorizer) = &artifact.vectorizer {
                features.merge(text::tfidf_features(text_input, vectorizer));
            }
        }

        run(artifact, &features, ModelKind::Hybrid)
    }

    fn artifact(&self, kind: ModelKind) -> Result<&ModelArtifact, PredictError> {
        self.registry
            .get(kind)
            .ok_or(PredictError::ModelUnavailable(kind))
    }
}

/// Scale and apply the decision function.
fn run(
    artifact: &ModelArtifact,
    features: &FeatureSet,
    kind: ModelKind,
) -> Result<Prediction, PredictError> {
    let vector = features.aligned(&artifact.feature_names);
    if vector.len() != artifact.coefficients.len() {
        return Err(PredictError::FeatureMismatch {
            expected: artifact.coefficients.len(),
            actual: vector.len(),
        });
    }

    let x = Array1::from_vec(vector);
    let mean = Array1::from_vec(artifact.scaler.mean.clone());
    let scale = Array1::from_vec(artifact.scaler.scale.clone());
    let weights = Array1::from_vec(artifact.coefficients.clone());

    // (x - mean) / scale, guarding against zero-variance columns
    let scaled = (&x - &mean) / scale.mapv(|s| if s.abs() < 1e-12 { 1.0 } else { s });

    let z = scaled.dot(&weights) + artifact.intercept;
    let positive_prob = sigmoid(z);

    let label = if positive_prob > 0.5 {
        Label::Phishing
    } else {
        Label::Legitimate
    };
    let confidence = positive_prob.max(1.0 - positive_prob);

    Ok(Prediction {
        label,
        confidence,
        model_kind: kind,
        timestamp: Utc::now(),
    })
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
