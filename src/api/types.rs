//! Request/response bodies of the backend contract and the results the
//! client hands to callers.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Request body for `POST /ask`.
#[derive(Debug, Serialize)]
pub(crate) struct AskRequest<'a> {
    pub question: &'a str,
}

/// Response body from `POST /ask`.
#[derive(Debug, Deserialize)]
pub(crate) struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub is_safe_response: Option<bool>,
}

/// Request body for `POST /detect`.
#[derive(Debug, Serialize)]
pub(crate) struct DetectRequest<'a> {
    pub step_text: &'a str,
}

/// Response body from `POST /detect`.
#[derive(Debug, Deserialize)]
pub(crate) struct DetectResponse {
    #[allow(dead_code)]
    #[serde(default)]
    pub step_text: String,
    pub is_anomaly: bool,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    /// Parsed from a backend response.
    Live,
    /// Canned content after a failed request.
    Fallback,
    /// Canned content on the web platform; no request was made.
    Demo,
}

impl ResponseSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
            Self::Demo => "demo",
        }
    }

    /// Whether the result is placeholder content rather than a backend answer.
    pub fn is_degraded(self) -> bool {
        !matches!(self, Self::Live)
    }
}

impl std::fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a connectivity check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectivityStatus {
    pub connected: bool,
    pub message: String,
    pub source: ResponseSource,
}

/// Answer to a repair question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResult {
    pub answer: String,
    /// Backend confidence in `[0, 1]`, when it reported one.
    pub confidence: Option<f64>,
    pub is_safe_response: bool,
    pub source: ResponseSource,
}

/// Anomaly analysis of a block of repair steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectResult {
    pub issue_label: String,
    /// `round(score * 100)`.
    pub confidence_percent: u8,
    pub recommended_steps: Vec<String>,
    pub is_anomaly: bool,
    pub raw_score: f64,
    pub source: ResponseSource,
}
