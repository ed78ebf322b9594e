//! Error taxonomy shared by the transport, session and decoding layers.
//!
//! Every failure is returned to the caller; nothing in the library terminates
//! the process.

use core::fmt;
use std::error::Error;

/// Top-level error returned by every client operation.
#[derive(Debug)]
pub enum ClientError {
    /// Network or connection failure. Never retried.
    Transport(String),
    /// The service answered with a status above 200.
    HttpStatus { status: u16, body: String },
    Auth(AuthError),
    Decode(DecodeError),
    Control(ControlError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(s) => write!(f, "transport error: {}", s),
            ClientError::HttpStatus { status, body } => write!(f, "http {}: {}", status, body),
            ClientError::Auth(e) => write!(f, "auth error: {}", e),
            ClientError::Decode(e) => write!(f, "decode error: {}", e),
            ClientError::Control(e) => write!(f, "control error: {}", e),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::Auth(e) => Some(e),
            ClientError::Decode(e) => Some(e),
            ClientError::Control(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AuthError> for ClientError {
    fn from(value: AuthError) -> Self {
        ClientError::Auth(value)
    }
}

impl From<DecodeError> for ClientError {
    fn from(value: DecodeError) -> Self {
        ClientError::Decode(value)
    }
}

impl From<ControlError> for ClientError {
    fn from(value: ControlError) -> Self {
        ClientError::Control(value)
    }
}

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The login endpoint refused the credentials.
    LoginRejected { status: u16, body: String },
    /// The validation probe refused a previously issued token.
    TokenRejected { status: u16, body: String },
    /// Re-authentication is needed but no username/password is available.
    NoCredentials,
    /// Neither a stored token nor credentials were supplied.
    MissingToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::LoginRejected { status, body } => write!(f, "login rejected (http {}): {}", status, body),
            AuthError::TokenRejected { status, body } => write!(f, "token rejected (http {}): {}", status, body),
            AuthError::NoCredentials => write!(f, "token is no longer valid and no credentials are configured"),
            AuthError::MissingToken => write!(f, "no token or credentials configured"),
        }
    }
}

impl Error for AuthError {}

/// A response body that does not match the expected schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// JSON path of the offending value (`.` for the document root).
    pub path: String,
    pub message: String,
    /// Raw response body, kept for diagnostics.
    pub body: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.message, self.path, self.body)
    }
}

impl Error for DecodeError {}

/// A control request the service did not acknowledge with the success body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlError {
    /// HTTP status when the failure was signalled at the HTTP level.
    pub status: Option<u16>,
    pub reason: String,
    pub body: String,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (http {}): {}", self.reason, status, self.body),
            None => write!(f, "{}: {}", self.reason, self.body),
        }
    }
}

impl Error for ControlError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_body_for_diagnostics() {
        let err = ClientError::HttpStatus {
            status: 403,
            body: r#"{"code":4100}"#.into(),
        };
        assert_eq!(err.to_string(), r#"http 403: {"code":4100}"#);

        let err = ClientError::from(ControlError {
            status: None,
            reason: "unexpected control response".into(),
            body: r#"{"result":1}"#.into(),
        });
        assert_eq!(err.to_string(), r#"control error: unexpected control response: {"result":1}"#);
    }

    #[test]
    fn source_points_at_inner_error() {
        let err = ClientError::from(AuthError::NoCredentials);
        assert!(err.source().is_some());
        assert!(ClientError::Transport("refused".into()).source().is_none());
    }
}
