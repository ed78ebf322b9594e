//! Re-authentication policy for long-lived callers.
//!
//! A caller that persisted a token from an earlier run tries it first and only
//! logs in again when the service rejects it.

use log::info;

use crate::client::ComfortCloudClient;
use crate::error::{AuthError, ClientError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Credentials are usable only when both parts are non-empty.
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some(Credentials {
                username: u.to_string(),
                password: p.to_string(),
            }),
            _ => None,
        }
    }
}

/// How [`resume`] obtained the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resumed {
    /// The stored token was still accepted; no login was made.
    Reused,
    /// A fresh login was made. Holds the new token so the caller can persist it.
    LoggedIn(String),
}

/// Bring `client` into an active session.
///
/// - A stored token that passes validation is reused.
/// - A rejected or missing token falls back to exactly one login when
///   credentials are available.
/// - Without credentials the rejection surfaces as an [`AuthError`].
///
/// Transport failures during validation are returned as-is; they say nothing
/// about the token.
pub fn resume(
    client: &mut ComfortCloudClient,
    stored_token: Option<&str>,
    credentials: Option<&Credentials>,
) -> Result<Resumed, ClientError> {
    let rejection = match stored_token.filter(|t| !t.trim().is_empty()) {
        Some(token) => match client.validate(token.trim()) {
            Ok(()) => {
                info!("Reusing stored session token");
                return Ok(Resumed::Reused);
            }
            Err(ClientError::Auth(e)) => Some(e),
            Err(e) => return Err(e),
        },
        None => None,
    };

    match (credentials, rejection) {
        (Some(c), _) => {
            let session = client.login(&c.username, &c.password)?;
            Ok(Resumed::LoggedIn(session.token))
        }
        (None, Some(_)) => Err(AuthError::NoCredentials.into()),
        (None, None) => Err(AuthError::MissingToken.into()),
    }
}
