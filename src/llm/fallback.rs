//! Heuristic fallback verdict
//!
//! Deterministic rule set used when the completion endpoint is unreachable or
//! its output is unparsable. Scores the same lexical signals the feature
//! extractors compute and always produces a fully-populated verdict: the
//! explanation is never empty and recommendations match the verdict.

use crate::features::{text, url};
use crate::ml::Label;

use super::parser::LlmVerdict;

/// Score at or above which the heuristic verdict is Phishing.
const PHISHING_THRESHOLD: f64 = 0.4;

/// Build a verdict from URL and/or text signals alone.
pub fn heuristic_verdict(url_input: Option<&str>, text_input: Option<&str>) -> LlmVerdict {
    let mut score = 0.0f64;
    let mut risk_factors = Vec::new();

    if let Some(u) = url_input {
        score += score_url(u, &mut risk_factors);
    }
    if let Some(t) = text_input {
        score += score_text(t, &mut risk_factors);
    }

    let score = score.min(1.0);
    let label = if score >= PHISHING_THRESHOLD {
        Label::Phishing
    } else {
        Label::Legitimate
    };

    // Distance from the threshold drives confidence; capped below certainty
    // since no model was consulted.
    let confidence = (0.5 + (score - PHISHING_THRESHOLD).abs()).min(0.9);

    let explanation = match label {
        Label::Phishing => format!(
            "Heuristic analysis flagged {} suspicious signal(s): {}. \
             The completion endpoint was unavailable, so this verdict comes \
             from deterministic rules over the input.",
            risk_factors.len(),
            risk_factors.join("; ")
        ),
        Label::Legitimate => {
            "Heuristic analysis found no strong phishing signals in the input. \
             The completion endpoint was unavailable, so this verdict comes \
             from deterministic rules over the input."
                .to_string()
        }
    };

    let recommendations = match label {
        Label::Phishing => vec![
            "Do not click links or reply until the source is verified".to_string(),
            "Report the content to your security team".to_string(),
        ],
        Label::Legitimate => vec![
            "No action required, but stay cautious with unexpected requests".to_string(),
        ],
    };

    LlmVerdict {
        label,
        confidence,
        explanation,
        risk_factors,
        recommendations,
    }
}

fn score_url(input: &str, risk_factors: &mut Vec<String>) -> f64 {
    let features = url::extract(input);
    let mut score = 0.0;

    if features.get("has_ip") == Some(1.0) {
        score += 0.4;
        risk_factors.push("IP address used instead of a domain name".to_string());
    }
    if features.get("is_shortened") == Some(1.0) {
        score += 0.3;
        risk_factors.push("URL shortener hides the real destination".to_string());
    }
    if features.get("suspicious_tld") == Some(1.0) {
        score += 0.3;
        risk_factors.push("top-level domain frequently used for phishing".to_string());
    }
    if features.get("has_https") == Some(0.0) {
        score += 0.15;
        risk_factors.push("connection is not encrypted (no https)".to_string());
    }
    if input.contains('@') {
        score += 0.25;
        risk_factors.push("'@' in URL can mask the true host".to_string());
    }

    let keywords = features.get("suspicious_keywords").unwrap_or(0.0);
    if keywords >= 2.0 {
        score += 0.1 * keywords;
        risk_factors.push(format!("{} phishing-associated keywords in the URL", keywords as u64));
    }
    if features.get("url_length").unwrap_or(0.0) > 75.0 {
        score += 0.1;
        risk_factors.push("unusually long URL".to_string());
    }

    score
}

fn score_text(input: &str, risk_factors: &mut Vec<String>) -> f64 {
    let features = text::extract(input);
    let mut score = 0.0;

    let keywords = features.get("suspicious_keywords").unwrap_or(0.0);
    if keywords >= 3.0 {
        score += 0.5;
        risk_factors.push(format!(
            "{} urgency/lure keywords in the message",
            keywords as u64
        ));
    } else if keywords >= 1.0 {
        score += 0.15 * keywords;
        risk_factors.push(format!(
            "{} urgency/lure keyword(s) in the message",
            keywords as u64
        ));
    }

    // All-caps shouting is an urgency tactic
    let words: Vec<&str> = input.split_whitespace().collect();
    let shouted = words
        .iter()
        .filter(|w| w.len() >= 4 && w.chars().all(|c| !c.is_lowercase()))
        .count();
    if shouted > 0 {
        score += 0.1;
        risk_factors.push("all-caps emphasis suggests pressure tactics".to_string());
    }

    if features.get("special_char_ratio").unwrap_or(0.0) > 0.15 {
        score += 0.1;
        risk_factors.push("unusually high special-character density".to_string());
    }

    score
}
