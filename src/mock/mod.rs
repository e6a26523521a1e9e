//! Local stand-in for the repair backend.
//!
//! Serves the same three endpoints as the real API (sync, via `tiny_http`):
//! - `GET /health`: `{"status": "healthy", "timestamp": ...}`
//! - `POST /ask`: canned guides picked by keyword, with a confidence
//! - `POST /detect`: keyword-scored anomaly check against a threshold
//!
//! Launched via `repair-ai mock-server` (default: `http://127.0.0.1:8000`),
//! and spawned on an ephemeral port by the integration tests.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Response, Server, StatusCode};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockOptions {
    /// `/detect` reports an anomaly when the score reaches this value.
    pub anomaly_threshold: f64,
    /// Status code `/health` answers with.
    pub health_status: u16,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
            health_status: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AskBody {
    question: String,
}

#[derive(Serialize)]
struct AskReply {
    answer: String,
    confidence: f64,
    is_safe_response: bool,
}

#[derive(Deserialize)]
struct DetectBody {
    step_text: String,
}

#[derive(Serialize)]
struct DetectReply {
    step_text: String,
    is_anomaly: bool,
    score: f64,
}

// ---------------------------------------------------------------------------
// Canned knowledge
// ---------------------------------------------------------------------------

/// `(keywords, answer, confidence)`; first entry with any keyword wins.
const GUIDES: &[(&[&str], &str, f64)] = &[
    (
        &["battery"],
        "1. Power the device off completely.\n2. Remove the back cover or screws.\n3. Disconnect the battery connector before anything else.\n4. Release the adhesive strips slowly; never puncture the cell.\n5. Fit the new battery, reconnect, and test before closing.",
        0.95,
    ),
    (
        &["screen", "display", "lcd"],
        "1. Power off and remove the SIM tray.\n2. Heat the edges to soften the adhesive.\n3. Lift the panel with a suction cup and open with a plastic pick.\n4. Disconnect the battery, then the display cables.\n5. Transfer parts to the new screen, reconnect and test.",
        0.95,
    ),
    (
        &["charging", "charge", "port"],
        "1. Inspect the port with a light for lint or corrosion.\n2. Clean with a wooden toothpick and compressed air.\n3. Try a known-good cable and charger.\n4. If it still fails, replace the charging flex with the battery disconnected.",
        0.96,
    ),
    (
        &["water", "wet", "liquid"],
        "1. Power off immediately and do not charge.\n2. Remove the case, SIM tray and battery if possible.\n3. Dry the outside and leave the device open in a dry, ventilated place for 48 hours.\n4. Clean visible corrosion with isopropyl alcohol before testing.",
        0.97,
    ),
];

const GENERIC_ANSWER: &str = "1. Identify the exact device model.\n2. Power off and disconnect the battery before opening.\n3. Use proper tools and keep screws organised.\n4. Consult the manufacturer's service guide for the affected part.";
const GENERIC_CONFIDENCE: f64 = 0.45;

/// Phrases that mark a repair step as risky.
const RISKY_PHRASES: &[&str] = &[
    "without disconnecting",
    "skip",
    "force",
    "hammer",
    "puncture",
    "bypass",
    "while charging",
    "metal",
];

fn answer_for(question: &str) -> AskReply {
    let lower = question.to_lowercase();
    let (answer, confidence) = GUIDES
        .iter()
        .find(|(keywords, _, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or((GENERIC_ANSWER, GENERIC_CONFIDENCE), |(_, answer, confidence)| {
            (*answer, *confidence)
        });
    AskReply {
        answer: answer.to_string(),
        confidence,
        is_safe_response: true,
    }
}

/// 0.15 for clean text, plus 0.35 per risky phrase, capped at 0.99.
fn anomaly_score(step_text: &str) -> f64 {
    let lower = step_text.to_lowercase();
    let hits = RISKY_PHRASES.iter().filter(|p| lower.contains(*p)).count();
    (0.15 + 0.35 * hits as f64).min(0.99)
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A mock backend running on a background thread. Stops when dropped.
pub struct MockServer {
    server: Arc<Server>,
    addr: SocketAddr,
    worker: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Bind `addr` (use port 0 for an ephemeral port) and start serving.
    pub fn spawn(addr: &str, options: MockOptions) -> Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| anyhow::anyhow!("failed to start mock server on {addr}: {e}"))?;
        let addr = server
            .server_addr()
            .to_ip()
            .context("mock server is not listening on an IP address")?;
        let server = Arc::new(server);

        let worker = {
            let server = Arc::clone(&server);
            std::thread::spawn(move || run(&server, options, false))
        };

        Ok(Self {
            server,
            addr,
            worker: Some(worker),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for an `ApiClient`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Run the mock backend in the foreground until the process is stopped.
pub fn serve(addr: &str, options: MockOptions) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start mock server on {addr}: {e}"))?;

    println!("repair-ai mock backend running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    run(&server, options, true);
    Ok(())
}

/// Handle requests sequentially until the server is unblocked.
fn run(server: &Server, options: MockOptions, access_log: bool) {
    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let resp = if method == Method::Post {
            let mut buf = String::new();
            match request.as_reader().read_to_string(&mut buf) {
                Ok(_) => dispatch(&method, &url, Some(&buf), options),
                Err(e) => bad_request(&e),
            }
        } else {
            dispatch(&method, &url, None, options)
        };
        let status = resp.status_code().0;
        let _ = request.respond(resp);

        if access_log {
            println!(
                "{} {} {} {}",
                chrono::Local::now().format("%H:%M:%S"),
                method,
                url,
                status
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn dispatch(
    method: &Method,
    url: &str,
    body: Option<&str>,
    options: MockOptions,
) -> Response<Cursor<Vec<u8>>> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/health") => json_response(
            options.health_status,
            &serde_json::json!({
                "status": if options.health_status < 300 { "healthy" } else { "unhealthy" },
                "timestamp": chrono::Local::now().to_rfc3339(),
            }),
        ),
        (&Method::Post, "/ask") => match serde_json::from_str::<AskBody>(body.unwrap_or("")) {
            Ok(req) => json_response(200, &answer_for(&req.question)),
            Err(e) => unprocessable(&e),
        },
        (&Method::Post, "/detect") => match serde_json::from_str::<DetectBody>(body.unwrap_or("")) {
            Ok(req) => {
                let score = anomaly_score(&req.step_text);
                json_response(
                    200,
                    &DetectReply {
                        is_anomaly: score >= options.anomaly_threshold,
                        score,
                        step_text: req.step_text,
                    },
                )
            }
            Err(e) => unprocessable(&e),
        },
        _ => json_response(404, &serde_json::json!({ "detail": "Not Found" })),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn bad_request(err: &std::io::Error) -> Response<Cursor<Vec<u8>>> {
    json_response(
        400,
        &serde_json::json!({ "detail": format!("could not read request body: {err}") }),
    )
}

fn unprocessable(err: &serde_json::Error) -> Response<Cursor<Vec<u8>>> {
    json_response(422, &serde_json::json!({ "detail": err.to_string() }))
}

fn json_response(status: u16, body: &impl Serialize) -> Response<Cursor<Vec<u8>>> {
    let data = serde_json::to_vec(body).unwrap_or_default();
    let resp = Response::from_data(data).with_status_code(StatusCode(status));
    match Header::from_bytes("Content-Type", "application/json") {
        Ok(header) => resp.with_header(header),
        Err(()) => resp,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
