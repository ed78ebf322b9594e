//! Blocking HTTP transport using `ureq` (no async).
//!
//! - Attaches the fixed header set the service expects from its mobile app.
//! - Any status above 200 is a failure; the body is kept for diagnostics.
//! - No retries and no backoff.

use std::time::Duration;

use http::StatusCode;
use log::{debug, trace};

use crate::error::ClientError;

const APP_TYPE: &str = "1";
const APP_VERSION: &str = "1.9.0";
const USER_AGENT: &str = "G-RAC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Transport settings chosen by the caller.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Deadline for a whole request. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// A response with a status of 200 or below.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Response {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct Transport {
    agent: ureq::Agent,
}

impl Transport {
    pub fn new(config: &TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .into();
        Transport { agent }
    }

    /// Send one request. `token` becomes the authorization header when set.
    pub fn send(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: Option<&[u8]>,
    ) -> Result<Response, ClientError> {
        self.exchange(method, url, token, body, true)
    }

    /// Like [`Transport::send`], but neither body is logged. For requests that
    /// carry credentials or answer with a token.
    pub fn send_secret(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: Option<&[u8]>,
    ) -> Result<Response, ClientError> {
        self.exchange(method, url, token, body, false)
    }

    fn exchange(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: Option<&[u8]>,
        log_bodies: bool,
    ) -> Result<Response, ClientError> {
        debug!("{} {}", method.as_str(), url);
        if let Some(b) = body
            && log_bodies
        {
            debug!("request body: {}", String::from_utf8_lossy(b));
        }

        let result = match method {
            Method::Get => with_headers(self.agent.get(url), token).call(),
            Method::Post => with_headers(self.agent.post(url), token).send(body.unwrap_or_default()),
        };

        let mut res = result.map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = res.status();
        let bytes = res
            .body_mut()
            .read_to_vec()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        if log_bodies {
            trace!("response {}: {}", status, String::from_utf8_lossy(&bytes));
        } else {
            trace!("response {} ({} bytes, not logged)", status, bytes.len());
        }

        if status.as_u16() > 200 {
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(Response { status, body: bytes })
    }
}

fn with_headers<B>(req: ureq::RequestBuilder<B>, token: Option<&str>) -> ureq::RequestBuilder<B> {
    let req = match token {
        Some(t) if !t.is_empty() => req.header("X-User-Authorization", t),
        _ => req,
    };
    req.header("X-APP-TYPE", APP_TYPE)
        .header("X-APP-VERSION", APP_VERSION)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/json; charset=utf-8")
        .header("Content-Type", "application/json")
        .header("Connection", "Keep-Alive")
}
