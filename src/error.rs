//! Probe failure taxonomy.
//!
//! Every failure of a single scrape is reported back to that scrape's
//! caller only. The process keeps serving `/metrics` and other probes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The outbound URL could not be built from the target
    #[error("invalid target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Target rejected by the configured allow-list
    #[error("target {0:?} is not in the allowed target list")]
    Forbidden(String),

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Device answered, but not with a 2xx status
    #[error("device at {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode status from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render metrics: {0}")]
    Render(#[from] prometheus::Error),
}

impl ProbeError {
    /// Short stable name, used as the `outcome` label of the probe counter.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::InvalidTarget { .. } => "invalid_target",
            ProbeError::Forbidden(_) => "forbidden",
            ProbeError::Timeout { .. } => "timeout",
            ProbeError::Transport { .. } => "transport",
            ProbeError::Status { .. } => "status",
            ProbeError::Body { .. } => "body",
            ProbeError::Decode { .. } => "decode",
            ProbeError::Render(_) => "render",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProbeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProbeError::Forbidden(_) => StatusCode::FORBIDDEN,
            ProbeError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProbeError {
    fn into_response(self) -> Response {
        (self.status_code(), format!("{self}\n")).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{").unwrap_err()
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err = ProbeError::Timeout {
            url: "http://10.0.0.5/status/".into(),
        };
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let errors = [
            ProbeError::InvalidTarget {
                target: String::new(),
                reason: "empty host".into(),
            },
            ProbeError::Status {
                url: "http://10.0.0.5/status/".into(),
                status: 500,
            },
            ProbeError::Decode {
                url: "http://10.0.0.5/status/".into(),
                source: decode_error(),
            },
        ];
        for err in errors {
            assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY, "{err}");
        }
    }

    #[test]
    fn forbidden_maps_to_403() {
        let err = ProbeError::Forbidden("169.254.169.254".into());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(err.to_string().contains("169.254.169.254"));
    }

    #[test]
    fn response_carries_status_and_message() {
        let response = ProbeError::Status {
            url: "http://10.0.0.5/status/".into(),
            status: 404,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
