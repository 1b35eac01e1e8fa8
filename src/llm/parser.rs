//! Completion parser
//!
//! Completions are supposed to be a single JSON object, but local models take
//! liberties. Parsing is tolerant: first the outermost JSON object is tried,
//! then a keyword/percentage salvage over the raw text. A completion that
//! yields no verdict either way is an explicit `Failed` outcome, which sends
//! the caller to the heuristic fallback instead of guessing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::ml::Label;

static PERCENTAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)%").expect("valid regex"));

const PHISHING_WORDS: &[&str] = &["phishing", "suspicious", "malicious", "dangerous"];
const LEGITIMATE_WORDS: &[&str] = &["legitimate", "safe", "clean", "normal"];

/// Structured verdict recovered from a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmVerdict {
    pub label: Label,
    pub confidence: f64,
    pub explanation: String,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Result of parsing a completion.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(LlmVerdict),
    Failed,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    prediction: String,
    #[serde(default = "default_confidence")]
    confidence: f64,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    risk_factors: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

fn default_confidence() -> f64 {
    0.5
}

/// Parse a raw completion into a verdict, or report failure.
pub fn parse_completion(completion: &str) -> ParseOutcome {
    if let Some(verdict) = parse_json_object(completion) {
        return ParseOutcome::Parsed(verdict);
    }
    salvage(completion)
}

/// Extract and decode the outermost `{...}` block.
fn parse_json_object(completion: &str) -> Option<LlmVerdict> {
    let start = completion.find('{')?;
    let end = completion.rfind('}')?;
    if end <= start {
        return None;
    }

    let raw: RawVerdict = serde_json::from_str(&completion[start..=end]).ok()?;
    let label = label_from_str(&raw.prediction)?;

    Some(LlmVerdict {
        label,
        confidence: raw.confidence.clamp(0.0, 1.0),
        explanation: if raw.explanation.is_empty() {
            completion.chars().take(500).collect()
        } else {
            raw.explanation
        },
        risk_factors: raw.risk_factors,
        recommendations: raw.recommendations,
    })
}

/// Keyword scan over free-form text when JSON extraction fails.
fn salvage(completion: &str) -> ParseOutcome {
    let lower = completion.to_lowercase();

    let label = if PHISHING_WORDS.iter().any(|w| lower.contains(w)) {
        Label::Phishing
    } else if LEGITIMATE_WORDS.iter().any(|w| lower.contains(w)) {
        Label::Legitimate
    } else {
        return ParseOutcome::Failed;
    };

    let confidence = PERCENTAGE
        .captures(completion)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|p| (p / 100.0).clamp(0.0, 1.0))
        .unwrap_or(0.5);

    ParseOutcome::Parsed(LlmVerdict {
        label,
        confidence,
        explanation: completion.chars().take(500).collect(),
        risk_factors: Vec::new(),
        recommendations: Vec::new(),
    })
}

fn label_from_str(s: &str) -> Option<Label> {
    let lower = s.to_lowercase();
    if lower.contains("phish") {
        Some(Label::Phishing)
    } else if lower.contains("legit") {
        Some(Label::Legitimate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        let completion = r#"Here is my analysis:
{"prediction": "PHISHING", "confidence": 0.85, "explanation": "Shortened URL hiding destination", "risk_factors": ["url shortener"], "recommendations": ["Do not click"]}
"#;
        let ParseOutcome::Parsed(v) = parse_completion(completion) else {
            panic!("expected parsed verdict");
        };
        assert_eq!(v.label, Label::Phishing);
        assert!((v.confidence - 0.85).abs() < 1e-9);
        assert_eq!(v.risk_factors, vec!["url shortener"]);
    }

    #[test]
    fn clamps_out_of_range_confidence() {
        let completion = r#"{"prediction": "LEGITIMATE", "confidence": 1.7}"#;
        let ParseOutcome::Parsed(v) = parse_completion(completion) else {
            panic!("expected parsed verdict");
        };
        assert_eq!(v.confidence, 1.0);
        assert!(!v.explanation.is_empty());
    }

    #[test]
    fn salvages_free_form_text() {
        let completion = "This link is clearly suspicious, I am 90% sure it is phishing.";
        let ParseOutcome::Parsed(v) = parse_completion(completion) else {
            panic!("expected salvaged verdict");
        };
        assert_eq!(v.label, Label::Phishing);
        assert!((v.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn salvages_legitimate_verdict() {
        let completion = "The message looks safe to me.";
        let ParseOutcome::Parsed(v) = parse_completion(completion) else {
            panic!("expected salvaged verdict");
        };
        assert_eq!(v.label, Label::Legitimate);
        assert_eq!(v.confidence, 0.5);
    }

    #[test]
    fn unintelligible_completion_fails() {
        assert_eq!(parse_completion("beep boop 42"), ParseOutcome::Failed);
        assert_eq!(parse_completion(""), ParseOutcome::Failed);
    }

    #[test]
    fn broken_json_falls_back_to_salvage() {
        let completion = r#"{"prediction": "PHISH...   this is malicious"#;
        let ParseOutcome::Parsed(v) = parse_completion(completion) else {
            panic!("expected salvaged verdict");
        };
        assert_eq!(v.label, Label::Phishing);
    }
}
