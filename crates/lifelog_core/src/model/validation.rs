//! Structural validation of incoming API payloads.
//!
//! # Responsibility
//! - Turn arbitrary JSON into typed lifelog structures or fail loudly.
//! - Run `Lifelog::validate()` on every decoded record.
//!
//! # Invariants
//! - Validation never coerces types: a numeric `id` or an object `contents`
//!   is rejected, not stringified.
//! - Optional fields (`markdown`, cursor, speaker fields, `children`) may be
//!   absent or `null`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::lifelog::{Lifelog, LifelogsResponse};

/// Payload shape mismatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}: {detail}")]
pub struct ValidationError {
    /// Short summary of what was being validated.
    pub message: String,
    /// Structural detail naming the mismatch.
    pub detail: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn invariant(path: &str, detail: String) -> Self {
        Self::new(format!("invalid value at {path}"), detail)
    }
}

/// Validates a full `GET /v1/lifelogs` response body.
pub fn parse_lifelogs_response(value: Value) -> Result<LifelogsResponse, ValidationError> {
    let response: LifelogsResponse = decode(value, "API response validation failed")?;
    for lifelog in &response.data.lifelogs {
        lifelog.validate()?;
    }
    Ok(response)
}

/// Validates a single lifelog object.
pub fn parse_lifelog(value: Value) -> Result<Lifelog, ValidationError> {
    let lifelog: Lifelog = decode(value, "lifelog validation failed")?;
    lifelog.validate()?;
    Ok(lifelog)
}

/// Validates a raw response body before it is decoded as JSON.
pub fn parse_lifelogs_body(body: &str) -> Result<LifelogsResponse, ValidationError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| ValidationError::new("API response is not valid JSON", err.to_string()))?;
    parse_lifelogs_response(value)
}

fn decode<T: DeserializeOwned>(value: Value, message: &str) -> Result<T, ValidationError> {
    serde_json::from_value(value).map_err(|err| ValidationError::new(message, err.to_string()))
}
