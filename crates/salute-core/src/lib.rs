//! salute-core: a minimal HTTP JSON API
//!
//! Every request runs through one ordered pipeline:
//!
//! ```text
//! JsonFormat -> TextBody -> JsonBody -> FormBody -> routes -> not_found
//! ```
//!
//! `GET /` answers `{"message":"Hello World!"}`; everything else is a 404
//! whose error message names the method and path.
//!
//! ## Features
//! - `native` (default) - tokio/hyper server

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod router;

#[cfg(feature = "native")]
pub mod server;

// Re-exports
pub use app::{build_app, App, AppBuilder, Fallback};
pub use config::{ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{BodyKind, Error, Result};
pub use request::{DecodedBody, Method, Request, RequestBuilder};
pub use response::{Response, ResponseBuilder, StatusCode};
pub use router::{handler, Handler, HandlerFuture, Routes};

// Middleware re-exports
pub use middleware::{FormBody, JsonBody, JsonFormat, Middleware, MiddlewareChain, Next, TextBody};

#[cfg(feature = "native")]
pub use server::{
    create_optimized_socket, from_hyper_request, to_hyper_response, ConnectionTracker, Server,
};
