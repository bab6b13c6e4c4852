//! HTTP Request types

use crate::error::{BodyKind, Error};
use crate::Result;
use serde::de::DeserializeOwned;
use smallvec::SmallVec;
use std::collections::HashMap;

pub use http::Method;

/// Request body decoded by one of the body decoders
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    /// `text/plain`
    Text(String),
    /// `application/json`
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded`, in body order
    Form(Vec<(String, String)>),
}

/// HTTP Request
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Request path (without query string)
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// Request headers (stack-allocated for small header counts)
    pub headers: SmallVec<[(String, String); 16]>,
    /// Raw request body
    pub body: bytes::Bytes,
    /// Decoded body, set at most once by a decoder
    pub decoded: Option<DecodedBody>,
}

impl Request {
    /// Create a new request
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: SmallVec::new(),
            body: bytes::Bytes::new(),
            decoded: None,
        }
    }

    /// Get a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get content-type header
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Media type of the content-type header, lowercased, parameters stripped
    ///
    /// `Application/JSON; charset=utf-8` yields `application/json`.
    pub fn media_type(&self) -> Option<String> {
        self.content_type().map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// Get content-length header
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length").and_then(|v| v.trim().parse().ok())
    }

    /// Parse query string into key-value pairs
    pub fn query_params(&self) -> HashMap<String, String> {
        self.query
            .as_deref()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default()
    }

    /// Decoded `text/plain` body
    pub fn text(&self) -> Option<&str> {
        match &self.decoded {
            Some(DecodedBody::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Decoded `application/json` body
    pub fn json(&self) -> Option<&serde_json::Value> {
        match &self.decoded {
            Some(DecodedBody::Json(value)) => Some(value),
            _ => None,
        }
    }

    /// Deserialize the decoded JSON body into `T`
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self
            .json()
            .ok_or_else(|| Error::malformed(BodyKind::Json, "no JSON body"))?;
        serde_json::from_value(value.clone()).map_err(|e| Error::malformed(BodyKind::Json, e))
    }

    /// Decoded `application/x-www-form-urlencoded` body
    pub fn form(&self) -> Option<&[(String, String)]> {
        match &self.decoded {
            Some(DecodedBody::Form(pairs)) => Some(pairs),
            _ => None,
        }
    }

    /// First form value for `name`
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form()?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for constructing requests
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Create a new builder
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request: Request::new(method, path),
        }
    }

    /// Set query string
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.request.query = Some(query.into());
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.push((name.into(), value.into()));
        self
    }

    /// Set body
    pub fn body(mut self, body: impl Into<bytes::Bytes>) -> Self {
        self.request.body = body.into();
        self
    }

    /// Build the request
    pub fn build(self) -> Request {
        self.request
    }
}
