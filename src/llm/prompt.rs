//! Prompt templates
//!
//! One template per analysis kind, instructing the model to answer with a
//! single JSON object. The URL template is deliberately phishing-biased:
//! uncertain links should be flagged, not cleared.

pub fn url_prompt(url: &str) -> String {
    format!(
        r#"You are a cybersecurity expert analyzing URLs for phishing indicators.

URL: {url}

Important:
- If ANY phishing indicator is present, prediction MUST be "PHISHING".
- Do NOT classify as "LEGITIMATE" unless you are certain the link is safe.
- When in doubt, default to "PHISHING".

Analyze this URL and provide a JSON response with:
1. prediction: "PHISHING" or "LEGITIMATE"
2. confidence: score from 0.0 to 1.0
3. explanation: detailed reasoning
4. risk_factors: list of suspicious elements found
5. recommendations: security advice

Consider these factors:
- Domain reputation and age
- Suspicious subdomains or paths
- URL shortening services
- Typosquatting attempts
- HTTPS vs HTTP
- Suspicious TLDs (.tk, .ml, .ga, etc.)
- IP addresses instead of domains
- Special characters and encoding

Response format (JSON only):
{{
    "prediction": "PHISHING",
    "confidence": 0.85,
    "explanation": "This URL shows multiple red flags...",
    "risk_factors": ["suspicious domain", "http instead of https"],
    "recommendations": ["Avoid clicking", "Report to security team"]
}}
"#
    )
}

pub fn text_prompt(text: &str) -> String {
    format!(
        r#"You are a cybersecurity expert analyzing text content for phishing indicators.

Text: {text}

Analyze this text and provide a JSON response with:
1. prediction: "PHISHING" or "LEGITIMATE"
2. confidence: score from 0.0 to 1.0
3. explanation: detailed reasoning
4. risk_factors: list of suspicious elements found
5. recommendations: security advice

Consider these factors:
- Urgency and pressure tactics
- Authority impersonation
- Suspicious requests (passwords, payments)
- Grammar and spelling errors
- Emotional manipulation
- Threats or consequences
- Social engineering techniques

Response format (JSON only):
{{
    "prediction": "PHISHING",
    "confidence": 0.90,
    "explanation": "This text contains classic phishing tactics...",
    "risk_factors": ["urgency tactics", "authority impersonation"],
    "recommendations": ["Do not respond", "Verify sender identity"]
}}
"#
    )
}

pub fn hybrid_prompt(url: &str, text: &str) -> String {
    format!(
        r#"You are a cybersecurity expert analyzing both URL and text content for phishing indicators.

URL: {url}
Text: {text}

Analyze both elements together and provide a JSON response with:
1. prediction: "PHISHING" or "LEGITIMATE"
2. confidence: score from 0.0 to 1.0
3. explanation: detailed reasoning considering both URL and text
4. risk_factors: list of suspicious elements found in both
5. recommendations: comprehensive security advice

Consider:
- Consistency between URL and text content
- Combined risk factors
- Overall threat assessment

Response format (JSON only):
{{
    "prediction": "PHISHING",
    "confidence": 0.95,
    "explanation": "Both URL and text show coordinated phishing attempts...",
    "risk_factors": ["suspicious domain", "urgency tactics"],
    "recommendations": ["Avoid interaction", "Report to security"]
}}
"#
    )
}

/// Free-form educational explanation of an earlier verdict.
pub fn explain_prompt(url: &str, text: &str, prediction: &str) -> String {
    format!(
        r#"Explain why this content was classified as {prediction}:

URL: {url}
Text: {text}

Provide a detailed, educational explanation suitable for end users."#
    )
}
