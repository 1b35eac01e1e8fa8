//! LLM bridge
//!
//! Sends the raw input to a local Ollama completion endpoint for an explained
//! second opinion. The pipeline is compose -> dispatch -> parse -> fallback:
//! dispatch carries a bounded timeout and is never retried; any failure or
//! unparsable completion falls through to a deterministic heuristic verdict,
//! so callers always receive a well-formed answer.

pub mod analyzer;
pub mod client;
pub mod fallback;
pub mod parser;
pub mod prompt;

pub use analyzer::{LlmAnalysis, LlmAnalyzer, LlmStatus};
pub use client::{LlmError, OllamaClient};
pub use parser::{LlmVerdict, ParseOutcome};

/// `llm_model` sentinel reported when the heuristic fallback produced the verdict.
pub const FALLBACK_MODEL: &str = "fallback";

/// `llm_model` sentinel reported when only the ML classifier answered.
pub const ML_ONLY_MODEL: &str = "ml-only";
