use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::types::RelayResponse;

/// Message carried by every failure that is not an upstream HTTP error.
pub const GENERIC_FAILURE: &str = "Prediction failed";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// The two error families a relay call can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Upstream answered with a non-2xx status.
    Upstream,
    /// The call itself failed, or one of the JSON layers did not parse.
    TransportOrParse,
}

impl ErrorKind {
    /// Status table: upstream errors echo the upstream status, everything else is a 500.
    pub fn http_status(self, upstream: Option<StatusCode>) -> StatusCode {
        match (self, upstream) {
            (ErrorKind::Upstream, Some(status)) => status,
            (ErrorKind::Upstream, None) => StatusCode::BAD_GATEWAY,
            (ErrorKind::TransportOrParse, _) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("API Gateway error ({})", .status.as_u16())]
    Upstream { status: StatusCode, body: String },

    #[error("invalid request body: {0}")]
    Request(#[source] serde_json::Error),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream response is not valid JSON: {0}")]
    OuterParse(#[source] serde_json::Error),

    #[error("envelope body is not valid JSON: {0}")]
    InnerParse(#[source] serde_json::Error),

    #[error("envelope body is present but is not a JSON-encoded string")]
    AmbiguousEnvelope,

    #[error("upstream returned a null result")]
    NullResult,
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::Upstream { .. } => ErrorKind::Upstream,
            RelayError::Request(_)
            | RelayError::Transport(_)
            | RelayError::OuterParse(_)
            | RelayError::InnerParse(_)
            | RelayError::AmbiguousEnvelope
            | RelayError::NullResult => ErrorKind::TransportOrParse,
        }
    }

    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            RelayError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind().http_status(self.upstream_status())
    }

    /// Short name used as the prefix of the `details` string.
    pub fn name(&self) -> &'static str {
        match self {
            RelayError::Upstream { .. } => "UpstreamError",
            RelayError::Request(_) => "RequestParseError",
            RelayError::Transport(err) if err.is_timeout() => "TimeoutError",
            RelayError::Transport(_) => "TransportError",
            RelayError::OuterParse(_) | RelayError::InnerParse(_) => "ParseError",
            RelayError::AmbiguousEnvelope | RelayError::NullResult => "EnvelopeError",
        }
    }
}

impl From<&RelayError> for RelayResponse {
    fn from(err: &RelayError) -> Self {
        match err {
            RelayError::Upstream { status, body } => RelayResponse::Failure {
                error: err.to_string(),
                status: Some(status.as_u16()),
                message: None,
                details: Some(body.clone()),
            },
            _ => RelayResponse::Failure {
                error: GENERIC_FAILURE.to_string(),
                status: None,
                message: Some(err.to_string()),
                details: Some(format!("{}: {}", err.name(), err)),
            },
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(status = status.as_u16(), kind = ?self.kind(), error = %self, "prediction relay failed");

        (status, Json(RelayResponse::from(&self))).into_response()
    }
}
