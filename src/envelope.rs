//! Unwrapping of upstream responses.
//!
//! The upstream either answers with the prediction itself or with a
//! Lambda proxy envelope (`{statusCode, headers, body}`) whose `body` is the
//! prediction encoded as a JSON string.

use serde_json::Value;

use crate::error::RelayError;

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamEnvelope {
    /// `body` is a non-empty string holding the encoded prediction.
    Lambda {
        status_code: Option<u16>,
        body: String,
    },
    /// No usable `body`; the outer value is the prediction.
    Direct(Value),
    /// `body` is present but is neither a string nor falsy.
    Ambiguous(Value),
    /// The whole response is JSON `null`; there is nothing to unwrap.
    Null,
}

impl UpstreamEnvelope {
    /// Parses the raw 2xx response text and classifies it.
    pub fn parse(text: &str) -> Result<Self, RelayError> {
        let outer: Value = serde_json::from_str(text).map_err(RelayError::OuterParse)?;
        Ok(Self::classify(outer))
    }

    pub fn classify(outer: Value) -> Self {
        if outer.is_null() {
            return UpstreamEnvelope::Null;
        }

        let encoded = match outer.get("body") {
            Some(Value::String(body)) if !body.is_empty() => Some(body.clone()),
            None | Some(Value::Null) | Some(Value::Bool(false)) | Some(Value::String(_)) => None,
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
            Some(_) => return UpstreamEnvelope::Ambiguous(outer),
        };

        match encoded {
            Some(body) => UpstreamEnvelope::Lambda {
                status_code: outer
                    .get("statusCode")
                    .and_then(Value::as_u64)
                    .and_then(|code| u16::try_from(code).ok()),
                body,
            },
            None => UpstreamEnvelope::Direct(outer),
        }
    }

    pub fn into_prediction(self) -> Result<Value, RelayError> {
        match self {
            UpstreamEnvelope::Lambda { body, .. } => {
                serde_json::from_str(&body).map_err(RelayError::InnerParse)
            }
            UpstreamEnvelope::Direct(prediction) => Ok(prediction),
            UpstreamEnvelope::Ambiguous(_) => Err(RelayError::AmbiguousEnvelope),
            UpstreamEnvelope::Null => Err(RelayError::NullResult),
        }
    }
}
