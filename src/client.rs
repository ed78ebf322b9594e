//! Standalone HTTP client for the Panasonic Comfort Cloud API.
//!
//! - Blocking client built on [`Transport`] (no async).
//! - Owns the session token, the base URL and the session state.
//! - Each public operation performs exactly one HTTP round trip.
//!
//! Authentication
//! - `login` exchanges credentials for a token, `validate` probes a stored one.
//! - The client never re-authenticates on its own; see `crate::session::resume`.

use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::decode::decode;
use crate::directory;
use crate::error::{AuthError, ClientError, ControlError};
use crate::models::command::Command;
use crate::models::comfort_cloud::*;
use crate::transport::{Method, Response, Transport, TransportConfig};

pub const DEFAULT_SERVER: &str = "https://accsmart.panasonic.com";

pub const LOGIN_PATH: &str = "/auth/login";
pub const VALIDATE_PATH: &str = "/auth/agreement/status/1";
pub const GROUPS_PATH: &str = "/device/group";
pub const DEVICE_STATUS_PATH: &str = "/deviceStatus/now/";
pub const HISTORY_PATH: &str = "/deviceHistoryData";
pub const CONTROL_PATH: &str = "/deviceStatus/control";

/// Where the client is in its authentication lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    Authenticating,
    Active,
    /// The validation probe rejected the token.
    Invalid,
    /// An authenticated call came back with 401.
    Expired,
}

pub struct ComfortCloudClient {
    transport: Transport,
    server: String,
    token: Option<String>,
    state: SessionState,
}

impl ComfortCloudClient {
    /// A client for `server`, or the public service when `server` is empty.
    pub fn new(server: &str) -> Self {
        Self::with_config(server, &TransportConfig::default())
    }

    pub fn with_config(server: &str, config: &TransportConfig) -> Self {
        let server = match server.trim() {
            "" => DEFAULT_SERVER.to_string(),
            s => s.trim_end_matches('/').to_string(),
        };
        debug!("Created new client for {}", server);
        ComfortCloudClient {
            transport: Transport::new(config),
            server,
            token: None,
            state: SessionState::NoSession,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Adopt a token obtained elsewhere without probing it.
    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            self.token = None;
            self.state = SessionState::NoSession;
        } else {
            self.token = Some(token);
            self.state = SessionState::Active;
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.server, path)
        } else {
            format!("{}/{}", self.server, path)
        }
    }

    fn send(&mut self, method: Method, path: &str, body: Option<&[u8]>) -> Result<Response, ClientError> {
        let url = self.url(path);
        let result = self.transport.send(method, &url, self.token.as_deref(), body);
        if let Err(ClientError::HttpStatus { status: 401, .. }) = &result {
            if self.state == SessionState::Active {
                warn!("Service answered 401 for {}; session expired", path);
                self.state = SessionState::Expired;
            }
        }
        result
    }

    fn get_json<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, ClientError> {
        let res = self.send(Method::Get, path, None)?;
        Ok(decode(&res.body)?)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&mut self, path: &str, body: &B) -> Result<T, ClientError> {
        let payload = encode(body)?;
        let res = self.send(Method::Post, path, Some(payload.as_slice()))?;
        Ok(decode(&res.body)?)
    }

    /// Exchange credentials for a session token.
    pub fn login(&mut self, username: &str, password: &str) -> Result<Session, ClientError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct LoginRequest<'a> {
            language: &'a str,
            login_id: &'a str,
            password: &'a str,
        }

        self.token = None;
        self.state = SessionState::Authenticating;
        let payload = encode(&LoginRequest {
            language: "0",
            login_id: username,
            password,
        })?;

        let outcome = match self
            .transport
            .send_secret(Method::Post, &self.url(LOGIN_PATH), None, Some(payload.as_slice()))
        {
            Ok(res) => decode::<Session>(&res.body).map_err(ClientError::from).and_then(|session| {
                if session.result_code != 0 || session.token.is_empty() {
                    Err(AuthError::LoginRejected {
                        status: res.status.as_u16(),
                        body: res.text(),
                    }
                    .into())
                } else {
                    Ok(session)
                }
            }),
            Err(ClientError::HttpStatus { status, body }) => Err(AuthError::LoginRejected { status, body }.into()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(session) => {
                self.token = Some(session.token.clone());
                self.state = SessionState::Active;
                info!("Logged in to {}", self.server);
                Ok(session)
            }
            Err(e) => {
                self.state = SessionState::NoSession;
                Err(e)
            }
        }
    }

    /// Probe `token` with a lightweight authenticated request.
    ///
    /// On success the token becomes the client's token. On rejection the state is
    /// [`SessionState::Invalid`] and the caller must log in again.
    pub fn validate(&mut self, token: &str) -> Result<(), ClientError> {
        self.token = Some(token.to_string());
        match self.transport.send(Method::Get, &self.url(VALIDATE_PATH), Some(token), None) {
            Ok(_) => {
                self.state = SessionState::Active;
                debug!("Stored token accepted");
                Ok(())
            }
            Err(ClientError::HttpStatus { status, body }) => {
                self.state = SessionState::Invalid;
                warn!("Stored token rejected (http {})", status);
                Err(AuthError::TokenRejected { status, body }.into())
            }
            Err(e) => Err(e),
        }
    }

    pub fn get_groups(&mut self) -> Result<Groups, ClientError> {
        self.get_json(GROUPS_PATH)
    }

    /// All devices of the account in group order, then device order.
    pub fn get_devices(&mut self) -> Result<Vec<Device>, ClientError> {
        Ok(directory::flatten(self.get_groups()?))
    }

    /// GUIDs of all devices in discovery order.
    pub fn list_devices(&mut self) -> Result<Vec<String>, ClientError> {
        Ok(directory::device_guids(&self.get_groups()?))
    }

    pub fn get_device_status(&mut self, device_guid: &str) -> Result<Device, ClientError> {
        let path = format!("{}{}", DEVICE_STATUS_PATH, escape_guid(device_guid));
        self.get_json(&path)
    }

    pub fn get_device_history(&mut self, device_guid: &str, query: &HistoryQuery) -> Result<History, ClientError> {
        self.post_json(HISTORY_PATH, &HistoryRequest::new(device_guid, query))
    }

    /// Send a sparse command. Only the attributes set on `command` are transmitted.
    pub fn control(&mut self, command: &Command) -> Result<(), ClientError> {
        if command.parameters.is_empty() {
            return Err(ControlError {
                status: None,
                reason: "command sets no attributes".to_string(),
                body: String::new(),
            }
            .into());
        }
        if let Some(t) = command.parameters.temperature_set
            && !t.is_finite()
        {
            return Err(ControlError {
                status: None,
                reason: format!("temperature {} is not a finite number", t),
                body: String::new(),
            }
            .into());
        }
        let payload = encode(command)?;

        let res = match self.send(Method::Post, CONTROL_PATH, Some(payload.as_slice())) {
            Ok(res) => res,
            Err(ClientError::HttpStatus { status, body }) => {
                return Err(ControlError {
                    status: Some(status),
                    reason: "control request failed".to_string(),
                    body,
                }
                .into());
            }
            Err(e) => return Err(e),
        };

        if is_control_success(&res.body) {
            Ok(())
        } else {
            Err(ControlError {
                status: None,
                reason: "unexpected control response".to_string(),
                body: res.text(),
            }
            .into())
        }
    }

    pub fn turn_on(&mut self, device_guid: &str) -> Result<(), ClientError> {
        self.control(&Command::new(device_guid).power(Power::On))
    }

    pub fn turn_off(&mut self, device_guid: &str) -> Result<(), ClientError> {
        self.control(&Command::new(device_guid).power(Power::Off))
    }

    pub fn set_temperature(&mut self, device_guid: &str, celsius: f64) -> Result<(), ClientError> {
        self.control(&Command::new(device_guid).temperature(celsius))
    }

    pub fn set_mode(&mut self, device_guid: &str, mode: OperationMode) -> Result<(), ClientError> {
        self.control(&Command::new(device_guid).mode(mode))
    }

    pub fn set_fan_speed(&mut self, device_guid: &str, speed: i64) -> Result<(), ClientError> {
        self.control(&Command::new(device_guid).fan_speed(speed))
    }

    pub fn set_eco_mode(&mut self, device_guid: &str, mode: EcoMode) -> Result<(), ClientError> {
        self.control(&Command::new(device_guid).eco_mode(mode))
    }

    /// Set both swing axes in one command.
    pub fn set_air_swing(&mut self, device_guid: &str, left_right: i64, up_down: i64) -> Result<(), ClientError> {
        self.control(&Command::new(device_guid).air_swing_lr(left_right).air_swing_ud(up_down))
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Vec<u8>, ClientError> {
    serde_json::to_vec(body).map_err(|e| ClientError::Transport(format!("failed to encode request: {}", e)))
}

/// The control endpoint acknowledges with exactly `{"result":0}`.
pub fn is_control_success(body: &[u8]) -> bool {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => value == serde_json::json!({ "result": 0 }),
        Err(_) => false,
    }
}

/// Escape a GUID for use as a path component (query-component rules, `+` becomes `%2B`).
pub fn escape_guid(guid: &str) -> String {
    url::form_urlencoded::byte_serialize(guid.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_server_falls_back_to_public_service() {
        assert_eq!(ComfortCloudClient::new("").server(), DEFAULT_SERVER);
        assert_eq!(
            ComfortCloudClient::new("http://customserver.com/").server(),
            "http://customserver.com"
        );
    }

    #[test]
    fn set_token_drives_state() {
        let mut client = ComfortCloudClient::new("");
        assert_eq!(client.state(), SessionState::NoSession);
        client.set_token("tok");
        assert_eq!(client.token(), Some("tok"));
        assert_eq!(client.state(), SessionState::Active);
        client.set_token("");
        assert_eq!(client.token(), None);
        assert_eq!(client.state(), SessionState::NoSession);
    }

    #[test]
    fn recognises_only_the_exact_success_body() {
        assert!(is_control_success(br#"{"result":0}"#));
        assert!(is_control_success(b"{ \"result\": 0 }\n"));
        assert!(!is_control_success(br#"{"result":1}"#));
        assert!(!is_control_success(br#"{"result":"0"}"#));
        assert!(!is_control_success(br#"{"result":0.0}"#));
        assert!(!is_control_success(br#"{"result":0,"message":"ok"}"#));
        assert!(!is_control_success(br#"[{"result":0}]"#));
        assert!(!is_control_success(b""));
        assert!(!is_control_success(b"OK"));
    }

    #[test]
    fn guids_are_query_escaped() {
        assert_eq!(escape_guid("CZ-CAPWFC1+B8B7F1B3E326"), "CZ-CAPWFC1%2BB8B7F1B3E326");
        assert_eq!(escape_guid("a b/c"), "a+b%2Fc");
        assert_eq!(escape_guid("DEV-1"), "DEV-1");
    }

    #[test]
    fn empty_command_is_rejected_before_sending() {
        let mut client = ComfortCloudClient::new("http://127.0.0.1:9");
        let err = client.control(&Command::new("DEV-1")).unwrap_err();
        assert!(matches!(err, ClientError::Control(ControlError { status: None, .. })));
    }

    #[test]
    fn non_finite_temperature_is_rejected_before_sending() {
        let mut client = ComfortCloudClient::new("http://127.0.0.1:9");
        for t in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            match client.set_temperature("DEV-1", t) {
                Err(ClientError::Control(ControlError { status: None, reason, body })) => {
                    assert!(reason.contains("not a finite number"));
                    assert!(body.is_empty());
                }
                other => panic!("unexpected result for {}: {:?}", t, other),
            }
        }
    }
}
