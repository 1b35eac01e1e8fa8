//! Model loading and prediction
//!
//! Classifier artifacts are JSON exports of the trained scikit-learn
//! pipelines: feature names in training order, logistic-regression weights,
//! standard-scaler parameters and (for text-aware models) the TF-IDF
//! vectorizer state. Loaded once at startup, immutable afterwards.

pub mod artifact;
pub mod predictor;
pub mod registry;

pub use artifact::{ArtifactError, ModelArtifact, ModelKind, ScalerParams, TfidfParams};
pub use predictor::{Label, PredictError, Prediction, Predictor};
pub use registry::ModelRegistry;
