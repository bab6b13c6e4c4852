//! Error types for salute-core
//!
//! Every error carries an HTTP status. Errors raised while handling a request
//! are turned into a JSON response by [`Error::into_response`]:
//!
//! ```text
//! HTTP/1.1 404 Not Found
//! content-type: application/json
//!
//! {"error":"Not Found: POST:/unknown"}
//! ```

use crate::response::{Response, ResponseBuilder, StatusCode};
use salute_router::RouteError;
use std::fmt;
use thiserror::Error;

/// Result type alias for salute operations
pub type Result<T> = std::result::Result<T, Error>;

/// Body format a decoder expected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Text,
    Json,
    Form,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BodyKind::Text => "text",
            BodyKind::Json => "JSON",
            BodyKind::Form => "form",
        };
        f.write_str(name)
    }
}

/// Error types for the salute HTTP server
#[derive(Debug, Error)]
pub enum Error {
    /// Body does not conform to its declared content type
    #[error("Malformed {kind} body: {reason}")]
    MalformedBody { kind: BodyKind, reason: String },

    /// No route matched
    #[error("Not Found: {method}:{path}")]
    NotFound { method: String, path: String },

    /// Body exceeds the configured limit
    #[error("Payload Too Large: body exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Route registration failed
    #[error("Invalid route: {0}")]
    Route(#[from] RouteError),

    /// Response serialization failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a not-found error for the given request line
    pub fn not_found(method: impl Into<String>, path: impl Into<String>) -> Self {
        Error::NotFound {
            method: method.into(),
            path: path.into(),
        }
    }

    /// Build a malformed-body error
    pub fn malformed(kind: BodyKind, reason: impl fmt::Display) -> Self {
        Error::MalformedBody {
            kind,
            reason: reason.to_string(),
        }
    }

    /// HTTP status carried by this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MalformedBody { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert into the terminal `{"error": message}` response
    pub fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        ResponseBuilder::new(self.status())
            .header("content-type", "application/json")
            .body(body.to_string())
            .build()
    }
}
