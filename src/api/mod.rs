//! Client for the repair backend (`/health`, `/ask`, `/detect`).
//!
//! Every operation makes at most one request and never fails: transport
//! errors, non-2xx statuses and unparseable bodies are all absorbed and
//! turned into a canned, clearly degraded result. The operations return
//! `Result<T, Infallible>` so the signature itself says so; callers unwrap
//! with an irrefutable `let Ok(result) = ...;`.
//!
//! On the `web` platform the backend is assumed unreachable and `ask` and
//! `status` answer with demo content without touching the network.

pub mod transport;
pub mod types;

use std::convert::Infallible;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::analytics::logger::{RequestLogEntry, RequestLogger};
use crate::config::schema::{ApiConfig, Platform};

pub use transport::{HttpResponse, Transport, UreqTransport};
pub use types::{AskResult, ConnectivityStatus, DetectResult, ResponseSource};

use types::{AskRequest, AskResponse, DetectRequest, DetectResponse};

pub const CONNECTED_MESSAGE: &str = "Connected successfully";
pub const WEB_STATUS_MESSAGE: &str = "Web demo mode - AI features available on mobile app";
pub const WEB_DEMO_ANSWER: &str = "This is a demo response for web. For full AI features, please use the mobile app with our trained repair models.";
pub const WEB_DEMO_CONFIDENCE: f64 = 0.85;

pub const FALLBACK_ASK_CONFIDENCE: f64 = 0.7;

pub const ANOMALY_LABEL: &str = "Potential issue detected";
pub const NO_ANOMALY_LABEL: &str = "No issues found";
pub const ANOMALY_STEP: &str =
    "Review this step carefully - it may not follow standard procedures";
pub const NO_ANOMALY_STEP: &str = "This step appears to follow standard repair procedures";

pub const FALLBACK_DETECT_LABEL: &str = "Unable to connect to anomaly detector";
pub const FALLBACK_DETECT_PERCENT: u8 = 75;
pub const FALLBACK_DETECT_SCORE: f64 = 0.25;
pub const FALLBACK_DETECT_STEPS: [&str; 3] = [
    "Check if the procedure follows safety guidelines",
    "Verify all tools are appropriate for the task",
    "Ensure proper sequence of operations",
];

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Backend client. Holds no per-request state; one instance can serve any
/// number of sequential calls.
pub struct ApiClient {
    base_url: String,
    platform: Platform,
    transport: Box<dyn Transport>,
    logger: RequestLogger,
}

impl ApiClient {
    /// Build a client from the resolved config, using the `ureq` transport.
    pub fn from_config(config: &ApiConfig) -> Self {
        let timeout = config.timeout_ms.map(Duration::from_millis);
        Self::new(&config.base_url, config.platform, UreqTransport::new(timeout))
    }

    pub fn new(base_url: &str, platform: Platform, transport: impl Transport + 'static) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            platform,
            transport: Box::new(transport),
            logger: RequestLogger::disabled(),
        }
    }

    pub fn with_logger(mut self, logger: RequestLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Full URL of an endpoint.
    ///
    /// `localhost` is pinned to `127.0.0.1`: the backend binds IPv4 only and
    /// some resolvers try `::1` first.
    fn endpoint(&self, path: &str) -> String {
        pin_localhost(&format!("{}{}", self.base_url, path))
    }

    // -----------------------------------------------------------------------
    // GET /health
    // -----------------------------------------------------------------------

    /// Check whether the backend is reachable, with a message for the status
    /// card.
    pub fn check_connectivity(&self) -> Result<ConnectivityStatus, Infallible> {
        if self.platform == Platform::Web {
            self.logger
                .log(&RequestLogEntry::new("status", "demo", true, 0));
            return Ok(ConnectivityStatus {
                connected: true,
                message: WEB_STATUS_MESSAGE.to_string(),
                source: ResponseSource::Demo,
            });
        }

        let start = Instant::now();
        let outcome = self.transport.get(&self.endpoint("/health"));
        let latency_ms = elapsed_ms(start);

        let (connected, message) = match outcome {
            Ok(resp) if resp.is_success() => (true, CONNECTED_MESSAGE.to_string()),
            Ok(resp) => (false, format!("API server error: {}", resp.status)),
            Err(err) => (false, format!("Connection failed: {err:#}")),
        };

        if !connected {
            self.logger.diag(&format!("health check failed: {message}"));
        }
        let entry = RequestLogEntry::new("status", "live", connected, latency_ms);
        self.logger.log(&if connected {
            entry
        } else {
            entry.with_detail(message.clone())
        });

        Ok(ConnectivityStatus {
            connected,
            message,
            source: ResponseSource::Live,
        })
    }

    /// Bare health check: `true` iff `/health` answers 2xx. Ignores the
    /// platform.
    pub fn check_health(&self) -> bool {
        let start = Instant::now();
        let healthy = matches!(
            self.transport.get(&self.endpoint("/health")),
            Ok(resp) if resp.is_success()
        );
        self.logger.log(&RequestLogEntry::new(
            "health",
            "live",
            healthy,
            elapsed_ms(start),
        ));
        healthy
    }

    // -----------------------------------------------------------------------
    // POST /ask
    // -----------------------------------------------------------------------

    /// Ask a repair question. The caller trims and validates `question`.
    pub fn ask_question(&self, question: &str) -> Result<AskResult, Infallible> {
        if self.platform == Platform::Web {
            self.logger.log(&RequestLogEntry::new("ask", "demo", true, 0));
            return Ok(AskResult {
                answer: WEB_DEMO_ANSWER.to_string(),
                confidence: Some(WEB_DEMO_CONFIDENCE),
                is_safe_response: true,
                source: ResponseSource::Demo,
            });
        }

        let start = Instant::now();
        let outcome = self.try_ask(question);
        let latency_ms = elapsed_ms(start);

        match outcome {
            Ok(result) => {
                self.logger
                    .log(&RequestLogEntry::new("ask", "live", true, latency_ms));
                Ok(result)
            }
            Err(err) => {
                let detail = format!("{err:#}");
                self.logger.diag(&detail);
                self.logger.log(
                    &RequestLogEntry::new("ask", "fallback", false, latency_ms)
                        .with_detail(detail),
                );
                Ok(fallback_answer(question))
            }
        }
    }

    // -----------------------------------------------------------------------
    // POST /detect
    // -----------------------------------------------------------------------

    /// Check a block of repair steps for anomalies.
    pub fn detect_anomaly(&self, step_text: &str) -> Result<DetectResult, Infallible> {
        let start = Instant::now();
        let outcome = self.try_detect(step_text);
        let latency_ms = elapsed_ms(start);

        match outcome {
            Ok(result) => {
                self.logger
                    .log(&RequestLogEntry::new("detect", "live", true, latency_ms));
                Ok(result)
            }
            Err(err) => {
                let detail = format!("{err:#}");
                self.logger.diag(&detail);
                self.logger.log(
                    &RequestLogEntry::new("detect", "fallback", false, latency_ms)
                        .with_detail(detail),
                );
                Ok(fallback_detection())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn try_ask(&self, question: &str) -> Result<AskResult> {
        let data: AskResponse = self
            .post("/ask", &AskRequest { question })
            .context("ask request failed")?;
        Ok(AskResult {
            answer: data.answer,
            confidence: data.confidence,
            is_safe_response: data.is_safe_response.unwrap_or(false),
            source: ResponseSource::Live,
        })
    }

    fn try_detect(&self, step_text: &str) -> Result<DetectResult> {
        let data: DetectResponse = self
            .post("/detect", &DetectRequest { step_text })
            .context("detect request failed")?;
        Ok(detection_from_response(&data))
    }

    fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: serde::Serialize,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_string(body).context("failed to encode request body")?;
        let resp = self.transport.post_json(&self.endpoint(path), &payload)?;
        if !resp.is_success() {
            anyhow::bail!("HTTP error! status: {}", resp.status);
        }
        serde_json::from_str(&resp.body).context("failed to parse response body")
    }
}

/// Swap the host for `127.0.0.1` when it is exactly `localhost`.
fn pin_localhost(url: &str) -> String {
    if let Some((scheme, rest)) = url.split_once("://")
        && let Some(after) = rest.strip_prefix("localhost")
        && (after.is_empty() || after.starts_with([':', '/', '?', '#']))
    {
        return format!("{scheme}://127.0.0.1{after}");
    }
    url.to_string()
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Result construction
// ---------------------------------------------------------------------------

/// Degraded answer used whenever `/ask` cannot be reached or understood.
pub fn fallback_answer(question: &str) -> AskResult {
    AskResult {
        answer: format!(
            "I'm currently unable to connect to the AI repair assistant. For \"{question}\", \
             I recommend checking your device manual or consulting with a qualified technician. \
             Common troubleshooting steps include checking power connections, ensuring all \
             cables are secure, and looking for any visible damage.\n\n\
             (Note: Using demo response - API not available)"
        ),
        confidence: Some(FALLBACK_ASK_CONFIDENCE),
        is_safe_response: true,
        source: ResponseSource::Fallback,
    }
}

/// Degraded detection result. The checklist does not depend on the input.
pub fn fallback_detection() -> DetectResult {
    DetectResult {
        issue_label: FALLBACK_DETECT_LABEL.to_string(),
        confidence_percent: FALLBACK_DETECT_PERCENT,
        recommended_steps: FALLBACK_DETECT_STEPS.iter().map(|s| s.to_string()).collect(),
        is_anomaly: false,
        raw_score: FALLBACK_DETECT_SCORE,
        source: ResponseSource::Fallback,
    }
}

fn detection_from_response(data: &DetectResponse) -> DetectResult {
    let (label, step) = if data.is_anomaly {
        (ANOMALY_LABEL, ANOMALY_STEP)
    } else {
        (NO_ANOMALY_LABEL, NO_ANOMALY_STEP)
    };
    DetectResult {
        issue_label: label.to_string(),
        confidence_percent: crate::presentation::confidence_percent(data.score),
        recommended_steps: vec![step.to_string()],
        is_anomaly: data.is_anomaly,
        raw_score: data.score,
        source: ResponseSource::Live,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
