//! Middleware implementations
//!
//! A middleware runs before routing. It may mutate the request (decoders
//! attach a parsed body) or the draft response (the formatter sets headers),
//! and it decides whether the pipeline continues.

pub mod body;
pub mod format;

// Re-exports for convenience
pub use body::{FormBody, JsonBody, TextBody, MEDIA_FORM, MEDIA_JSON, MEDIA_TEXT};
pub use format::JsonFormat;

use crate::{Request, Response, Result};

/// What the pipeline does after a middleware ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Hand the request to the next stage
    Continue,
    /// The draft response is final; skip the remaining stages
    Respond,
}

/// Middleware trait - process request before the router
pub trait Middleware: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Process the request. Errors abort the pipeline and are converted
    /// into an error response.
    fn handle(&self, req: &mut Request, res: &mut Response) -> Result<Next>;
}

/// Middleware chain, run in registration order
pub struct MiddlewareChain {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Names of the registered middlewares, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// Run middlewares in order, stopping at the first that responds or fails
    pub fn run(&self, req: &mut Request, res: &mut Response) -> Result<Next> {
        for m in &self.middlewares {
            if m.handle(req, res)? == Next::Respond {
                tracing::trace!(middleware = m.name(), "middleware responded");
                return Ok(Next::Respond);
            }
        }
        Ok(Next::Continue)
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new()
    }
}
