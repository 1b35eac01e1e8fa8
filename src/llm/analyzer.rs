//! LLM analyzer
//!
//! Drives the compose -> dispatch -> parse -> fallback pipeline and blends
//! the LLM verdict with the ML classifier's when both are present.

use serde::Serialize;

use crate::ml::{Label, Prediction};

use super::client::{LlmError, OllamaClient};
use super::fallback::heuristic_verdict;
use super::parser::{parse_completion, LlmVerdict, ParseOutcome};
use super::{prompt, FALLBACK_MODEL, ML_ONLY_MODEL};

/// Fully-populated analysis, from the LLM or the heuristic fallback.
#[derive(Debug, Clone, Serialize)]
pub struct LlmAnalysis {
    pub label: Label,
    pub confidence: f64,
    pub explanation: String,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    /// Backing model name, or the fallback sentinel.
    pub llm_model: String,
}

/// Status probe payload.
#[derive(Debug, Clone, Serialize)]
pub struct LlmStatus {
    pub available: bool,
    pub current_model: String,
    pub available_models: Vec<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct LlmAnalyzer {
    client: OllamaClient,
}

impl LlmAnalyzer {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    pub fn model_name(&self) -> &str {
        self.client.model()
    }

    pub async fn analyze_url(&self, url: &str) -> LlmAnalysis {
        let outcome = self.dispatch(&prompt::url_prompt(url)).await;
        match outcome {
            Some(mut verdict) => {
                // Phishing-biased policy for links: an uncertain "legitimate"
                // verdict is not good enough to clear a URL.
                if verdict.label == Label::Legitimate && verdict.confidence < 0.9 {
                    verdict.label = Label::Phishing;
                }
                self.from_verdict(verdict)
            }
            None => self.fallback(Some(url), None),
        }
    }

    pub async fn analyze_text(&self, text: &str) -> LlmAnalysis {
        match self.dispatch(&prompt::text_prompt(text)).await {
            Some(verdict) => self.from_verdict(verdict),
            None => self.fallback(None, Some(text)),
        }
    }

    pub async fn analyze_hybrid(&self, url: &str, text: &str) -> LlmAnalysis {
        match self.dispatch(&prompt::hybrid_prompt(url, text)).await {
            Some(verdict) => self.from_verdict(verdict),
            None => self.fallback(Some(url), Some(text)),
        }
    }

    /// Free-form explanation of an earlier verdict. Unlike the analysis
    /// paths this surfaces endpoint failure to the caller.
    pub async fn explain(
        &self,
        url: &str,
        text: &str,
        prediction: &str,
    ) -> Result<String, LlmError> {
        self.client
            .generate(&prompt::explain_prompt(url, text, prediction))
            .await
    }

    pub async fn status(&self) -> LlmStatus {
        let (available, available_models) = match self.client.available_models().await {
            Ok(models) => (true, models),
            Err(e) => {
                tracing::debug!("LLM endpoint unreachable: {}", e);
                (false, Vec::new())
            }
        };

        LlmStatus {
            available,
            current_model: self.client.model().to_string(),
            available_models,
            base_url: self.client.base_url().to_string(),
        }
    }

    /// Dispatch and parse; `None` means the fallback path must fire.
    async fn dispatch(&self, prompt: &str) -> Option<LlmVerdict> {
        let completion = match self.client.generate(prompt).await {
            Ok(completion) => completion,
            Err(e) => {
                tracing::warn!("LLM dispatch failed, using heuristic fallback: {}", e);
                return None;
            }
        };

        match parse_completion(&completion) {
            ParseOutcome::Parsed(verdict) => Some(verdict),
            ParseOutcome::Failed => {
                tracing::warn!("LLM completion unparsable, using heuristic fallback");
                None
            }
        }
    }

    fn from_verdict(&self, verdict: LlmVerdict) -> LlmAnalysis {
        LlmAnalysis {
            label: verdict.label,
            confidence: verdict.confidence,
            explanation: verdict.explanation,
            risk_factors: verdict.risk_factors,
            recommendations: verdict.recommendations,
            llm_model: self.client.model().to_string(),
        }
    }

    fn fallback(&self, url: Option<&str>, text: Option<&str>) -> LlmAnalysis {
        let verdict = heuristic_verdict(url, text);
        LlmAnalysis {
            label: verdict.label,
            confidence: verdict.confidence,
            explanation: verdict.explanation,
            risk_factors: verdict.risk_factors,
            recommendations: verdict.recommendations,
            llm_model: FALLBACK_MODEL.to_string(),
        }
    }
}

/// Combine an optional ML prediction with the LLM analysis.
///
/// No classifier loaded: the analysis stands as-is. Classifier loaded but the
/// heuristic fallback answered: the classifier's verdict replaces the
/// heuristic guess (the heuristic prose is kept) and `llm_model` reports
/// "ml-only". Both real: the verdicts are blended.
pub fn combine(ml: Option<&Prediction>, analysis: &mut LlmAnalysis) {
    let Some(ml) = ml else {
        return;
    };

    if analysis.llm_model == FALLBACK_MODEL {
        analysis.label = ml.label;
        analysis.confidence = ml.confidence;
        analysis.llm_model = ML_ONLY_MODEL.to_string();
    } else {
        blend(ml, analysis);
    }
}

/// Blend an ML prediction into an LLM analysis.
///
/// Policy (documented in DESIGN.md): both phishing -> Phishing with
/// confidence max(0.9, mean); exactly one phishing -> Phishing with
/// max(0.7, mean); both legitimate -> Legitimate with mean confidence.
pub fn blend(ml: &Prediction, analysis: &mut LlmAnalysis) {
    let mean = (ml.confidence + analysis.confidence) / 2.0;

    match (ml.label.is_phishing(), analysis.label.is_phishing()) {
        (true, true) => {
            analysis.label = Label::Phishing;
            analysis.confidence = mean.max(0.9);
        }
        (true, false) | (false, true) => {
            analysis.label = Label::Phishing;
            analysis.confidence = mean.max(0.7);
        }
        (false, false) => {
            analysis.label = Label::Legitimate;
            analysis.confidence = mean;
        }
    }
}
