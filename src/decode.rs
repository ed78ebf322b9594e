//! Response decoding.
//!
//! Bodies are decoded strictly into the types in `crate::models`. The only
//! leniency is for fields whose wire type is known to drift between schema
//! variants:
//! - flags arrive as `true`/`false` or as the integers `0`/`1`
//! - timestamps arrive as an integer or as a string holding an integer
//!
//! Any other shape is a [`DecodeError`] carrying the JSON path and the raw body.

use serde::Deserializer;
use serde::de::{self, DeserializeOwned, Unexpected, Visitor};

use crate::error::DecodeError;

/// Decode a raw response body into `T`.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    let mut de = serde_json::Deserializer::from_slice(body);
    let value = serde_path_to_error::deserialize(&mut de).map_err(|e| DecodeError {
        path: e.path().to_string(),
        message: e.inner().to_string(),
        body: String::from_utf8_lossy(body).into_owned(),
    })?;
    de.end().map_err(|e| DecodeError {
        path: ".".to_string(),
        message: e.to_string(),
        body: String::from_utf8_lossy(body).into_owned(),
    })?;
    Ok(value)
}

/// Deserialize a flag sent either as a JSON boolean or as `0`/`1`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct V;
    impl<'de> Visitor<'de> for V {
        type Value = bool;

        fn expecting(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
            write!(f, "a boolean or the integer 0 or 1")
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(Unexpected::Signed(other), &self)),
            }
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(Unexpected::Unsigned(other), &self)),
            }
        }
    }

    deserializer.deserialize_any(V)
}

/// Deserialize a timestamp sent either as an integer or as a numeric string.
pub fn timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct V;
    impl<'de> Visitor<'de> for V {
        type Value = i64;

        fn expecting(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
            write!(f, "an integer timestamp or a string containing one")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(value).map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(V)
}
