//! Model registry
//!
//! Eagerly loads the url/text/hybrid artifacts at process start and is
//! immutable afterwards; new artifacts require a restart. A missing or
//! corrupt artifact disables only that model kind, so the remaining
//! classifiers keep serving while /health reports the degradation.

use serde::Serialize;
use std::path::Path;

use super::artifact::{ModelArtifact, ModelKind};

/// Per-kind availability for the health endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelAvailability {
    pub url: bool,
    pub text: bool,
    pub hybrid: bool,
}

impl ModelAvailability {
    pub fn all_loaded(&self) -> bool {
        self.url && self.text && self.hybrid
    }
}

/// Read-only set of loaded classifier artifacts.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    url: Option<ModelArtifact>,
    text: Option<ModelArtifact>,
    hybrid: Option<ModelArtifact>,
}

impl ModelRegistry {
    /// Load all three artifacts from `dir`, tolerating per-kind failures.
    pub fn load(dir: &Path) -> Self {
        let mut registry = Self::default();

        for kind in ModelKind::ALL {
            let path = dir.join(kind.artifact_file());
            match ModelArtifact::load(&path) {
                Ok(artifact) => {
                    tracing::info!(
                        "{} model loaded ({} features)",
                        kind,
                        artifact.num_features()
                    );
                    registry.set(kind, artifact);
                }
                Err(e) => {
                    tracing::error!(
                        "{} model unavailable ({}): {}",
                        kind,
                        path.display(),
                        e
                    );
                }
            }
        }

        registry
    }

    /// Build a registry from in-memory artifacts.
    pub fn from_artifacts(
        url: Option<ModelArtifact>,
        text: Option<ModelArtifact>,
        hybrid: Option<ModelArtifact>,
    ) -> Self {
        Self { url, text, hybrid }
    }

    fn set(&mut self, kind: ModelKind, artifact: ModelArtifact) {
        match kind {
            ModelKind::Url => self.url = Some(artifact),
            ModelKind::Text => self.text = Some(artifact),
            ModelKind::Hybrid => self.hybrid = Some(artifact),
        }
    }

    pub fn get(&self, kind: ModelKind) -> Option<&ModelArtifact> {
        match kind {
            ModelKind::Url => self.url.as_ref(),
            ModelKind::Text => self.text.as_ref(),
            ModelKind::Hybrid => self.hybrid.as_ref(),
        }
    }

    pub fn availability(&self) -> ModelAvailability {
        ModelAvailability {
            url: self.url.is_some(),
            text: self.text.is_some(),
            hybrid: self.hybrid.is_some(),
        }
    }
}
