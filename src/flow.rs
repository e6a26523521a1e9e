//! Ask and detect screen logic: input validation, the client call and the
//! presentation decisions for the result.

use thiserror::Error;

use crate::api::{ApiClient, AskResult, DetectResult};
use crate::presentation;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please describe the issue")]
    EmptyDescription,
}

/// An answer ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct AskView {
    pub question: String,
    pub result: AskResult,
    /// Empty when the backend gave no confidence.
    pub tier_label: &'static str,
    pub tier_color: &'static str,
    pub confidence_percent: Option<u8>,
    pub needs_verification: bool,
    pub auto_speak: bool,
}

/// A detection result ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectView {
    pub step_text: String,
    pub result: DetectResult,
    pub tier_label: &'static str,
    pub tier_color: &'static str,
    /// The issue label is always read aloud.
    pub auto_speak: bool,
}

/// Submit a question. A blank question sends nothing and yields `None`.
pub fn ask(client: &ApiClient, question: &str) -> Option<AskView> {
    let question = question.trim();
    if question.is_empty() {
        return None;
    }

    let Ok(result) = client.ask_question(question);
    let confidence = result.confidence;
    Some(AskView {
        question: question.to_string(),
        tier_label: presentation::tier_label(confidence),
        tier_color: presentation::tier_color(confidence),
        confidence_percent: confidence.map(presentation::confidence_percent),
        needs_verification: presentation::needs_verification(confidence),
        auto_speak: presentation::should_auto_speak(confidence),
        result,
    })
}

/// Submit repair steps for anomaly analysis. Blank input is rejected before
/// any request is made.
pub fn detect(client: &ApiClient, text: &str) -> Result<DetectView, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }

    let Ok(result) = client.detect_anomaly(text);
    let confidence = Some(f64::from(result.confidence_percent) / 100.0);
    Ok(DetectView {
        step_text: text.to_string(),
        tier_label: presentation::tier_label(confidence),
        tier_color: presentation::tier_color(confidence),
        auto_speak: true,
        result,
    })
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::api::{HttpResponse, ResponseSource, Transport};
    use crate::config::Platform;

    /// Transport that must never be reached.
    struct Unreachable;

    impl Transport for Unreachable {
        fn get(&self, url: &str) -> Result<HttpResponse> {
            panic!("unexpected GET {url}");
        }

        fn post_json(&self, url: &str, _body: &str) -> Result<HttpResponse> {
            panic!("unexpected POST {url}");
        }
    }

    struct Refused;

    impl Transport for Refused {
        fn get(&self, _url: &str) -> Result<HttpResponse> {
            anyhow::bail!("connection refused")
        }

        fn post_json(&self, _url: &str, _body: &str) -> Result<HttpResponse> {
            anyhow::bail!("connection refused")
        }
    }

    struct Replying(&'static str);

    impl Transport for Replying {
        fn get(&self, _url: &str) -> Result<HttpResponse> {
            anyhow::bail!("not used")
        }

        fn post_json(&self, _url: &str, _body: &str) -> Result<HttpResponse> {
            Ok(HttpResponse {
                status: 200,
                body: self.0.to_string(),
            })
        }
    }

    fn client(transport: impl Transport + 'static) -> ApiClient {
        ApiClient::new("http://localhost:8000", Platform::Native, transport)
    }

    #[test]
    fn blank_question_sends_nothing() {
        assert!(ask(&client(Unreachable), "  \n ").is_none());
    }

    #[test]
    fn blank_description_is_rejected() {
        let err = detect(&client(Unreachable), "\t").unwrap_err();
        assert_eq!(err, ValidationError::EmptyDescription);
        assert_eq!(err.to_string(), "Please describe the issue");
    }

    #[test]
    fn fallback_answer_view() {
        let view = ask(&client(Refused), "  Why won't it charge? ").unwrap();
        assert_eq!(view.question, "Why won't it charge?");
        assert_eq!(view.result.source, ResponseSource::Fallback);
        assert_eq!(view.tier_label, "Medium Confidence");
        assert_eq!(view.tier_color, "#FF9800");
        assert_eq!(view.confidence_percent, Some(70));
        assert!(!view.needs_verification);
        assert!(view.auto_speak);
    }

    #[test]
    fn low_confidence_answer_needs_verification() {
        let view = ask(
            &client(Replying(r#"{"answer":"Maybe.","confidence":0.42,"is_safe_response":false}"#)),
            "q",
        )
        .unwrap();
        assert_eq!(view.tier_label, "Low Confidence");
        assert!(view.needs_verification);
        assert!(!view.auto_speak);
    }

    #[test]
    fn answer_without_confidence_is_neutral() {
        let view = ask(&client(Replying(r#"{"answer":"ok"}"#)), "q").unwrap();
        assert_eq!(view.tier_label, "");
        assert_eq!(view.tier_color, "#666666");
        assert_eq!(view.confidence_percent, None);
        assert!(!view.needs_verification);
        assert!(!view.auto_speak);
    }

    #[test]
    fn detect_view_uses_percent_tier() {
        let view = detect(
            &client(Replying(r#"{"step_text":"x","is_anomaly":true,"score":0.91}"#)),
            " x ",
        )
        .unwrap();
        assert_eq!(view.step_text, "x");
        assert_eq!(view.tier_label, "High Confidence");
        assert!(view.auto_speak);

        let fallback = detect(&client(Refused), "Unscrew the panel").unwrap();
        assert_eq!(fallback.result.confidence_percent, 75);
        assert_eq!(fallback.tier_label, "Medium Confidence");
    }
}
