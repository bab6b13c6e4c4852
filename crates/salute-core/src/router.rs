//! Handler registry on top of the salute-router route table
//!
//! The route table resolves `(method, path)` to a handler ID; handlers are
//! stored here, indexed by that ID. Both are frozen once the app is built.

use crate::{Error, Method, Request, Response, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by a handler
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send>>;

/// Route handler: takes the request and the draft response, returns the
/// final response
pub type Handler = Arc<dyn Fn(Request, Response) -> HandlerFuture + Send + Sync>;

/// Wrap an async function into a [`Handler`]
///
/// ```
/// use salute_core::{handler, Request, Response, Result};
///
/// async fn ping(_req: Request, res: Response) -> Result<Response> {
///     Ok(res)
/// }
///
/// let h = handler(ping);
/// ```
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    Arc::new(move |req, res| Box::pin(f(req, res)))
}

/// Route table plus the handlers it points at
#[derive(Default)]
pub struct Routes {
    table: salute_router::Router,
    handlers: Vec<Handler>,
}

impl Routes {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `method` and literal `path`
    pub fn add(&mut self, method: &Method, path: &str, handler: Handler) -> Result<()> {
        let id = u32::try_from(self.handlers.len())
            .map_err(|_| Error::Internal("too many routes".to_string()))?;
        self.table.insert(method.as_str(), path, id)?;
        self.handlers.push(handler);
        Ok(())
    }

    /// Find the handler for a request line
    pub fn find(&self, method: &Method, path: &str) -> Option<&Handler> {
        let matched = self.table.find(method.as_str(), path)?;
        self.handlers.get(matched.handler_id as usize)
    }

    /// Number of registered routes
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
