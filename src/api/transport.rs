//! HTTP transport seam.
//!
//! [`ApiClient`](super::ApiClient) talks to the backend through the
//! [`Transport`] trait so tests can swap in a transport that fails on demand.
//! Non-2xx statuses are returned as ordinary responses; only failures to get
//! any response at all (DNS, refused connection, timeout) are errors.
use std::time::Duration;

use anyhow::{Context, Result};

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpResponse>;

    /// POST `body` with `Content-Type: application/json`.
    fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse>;
}

// ---------------------------------------------------------------------------
// ureq
// ---------------------------------------------------------------------------

/// Synchronous transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `None` keeps ureq's own defaults.
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        into_response(self.agent.get(url).call())
    }

    fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse> {
        into_response(
            self.agent
                .post(url)
                .set("Content-Type", "application/json")
                .send_string(body),
        )
    }
}

fn into_response(result: std::result::Result<ureq::Response, ureq::Error>) -> Result<HttpResponse> {
    let resp = match result {
        Ok(resp) => resp,
        Err(ureq::Error::Status(_, resp)) => resp,
        Err(ureq::Error::Transport(err)) => return Err(err).context("request failed"),
    };
    let status = resp.status();
    let body = resp
        .into_string()
        .context("failed to read response body")?;
    Ok(HttpResponse { status, body })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        let ok = |status| HttpResponse {
            status,
            body: String::new(),
        };
        assert!(ok(200).is_success());
        assert!(ok(204).is_success());
        assert!(!ok(199).is_success());
        assert!(!ok(301).is_success());
        assert!(!ok(500).is_success());
    }

    #[test]
    fn refused_connection_is_an_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = UreqTransport::new(Some(Duration::from_secs(2)));
        assert!(transport.get(&format!("http://127.0.0.1:{port}/health")).is_err());
    }
}
