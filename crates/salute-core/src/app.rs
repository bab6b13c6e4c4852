//! Request pipeline
//!
//! An [`App`] runs every request through the same ordered stages:
//!
//! 1. middleware chain (formatter, body decoders)
//! 2. route table
//! 3. fallback, when no route matched
//!
//! Any error raised along the way becomes a JSON error response, so each
//! request yields exactly one [`Response`].

use crate::handlers;
use crate::middleware::{FormBody, JsonBody, JsonFormat, Middleware, MiddlewareChain, Next, TextBody};
use crate::router::{handler, Handler, Routes};
use crate::{Error, Method, Request, Response, Result};
use std::sync::Arc;
use tracing::{debug, error};

/// Fallback invoked when no route matched
pub type Fallback = Arc<dyn Fn(&Request) -> Error + Send + Sync>;

/// Immutable request pipeline
pub struct App {
    middleware: MiddlewareChain,
    routes: Routes,
    fallback: Fallback,
}

impl App {
    /// Start building an app
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Run a request through the pipeline
    pub async fn handle(&self, req: Request) -> Response {
        let method = req.method.clone();
        let path = req.path.clone();

        let res = match self.dispatch(req).await {
            Ok(res) => res,
            Err(e) => self.handle_error(e),
        };

        debug!(%method, %path, status = res.status.as_u16(), "request handled");
        res
    }

    /// Convert an error into its response, logging server errors
    pub fn handle_error(&self, err: Error) -> Response {
        if err.status().is_server_error() {
            error!(error = %err, "request failed");
        } else {
            debug!(error = %err, status = err.status().as_u16(), "request rejected");
        }
        err.into_response()
    }

    async fn dispatch(&self, mut req: Request) -> Result<Response> {
        let mut res = Response::ok();

        if self.middleware.run(&mut req, &mut res)? == Next::Respond {
            return Ok(res);
        }

        match self.routes.find(&req.method, &req.path) {
            Some(handler) => handler(req, res).await,
            None => Err((self.fallback)(&req)),
        }
    }

    /// Names of the middleware stages, in order
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middleware.names()
    }

    /// Number of registered routes
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

/// Builder for [`App`]
///
/// Routes are validated in [`AppBuilder::build`].
pub struct AppBuilder {
    middleware: MiddlewareChain,
    routes: Vec<(Method, String, Handler)>,
    fallback: Fallback,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            middleware: MiddlewareChain::new(),
            routes: Vec::new(),
            fallback: Arc::new(handlers::not_found),
        }
    }

    /// Append a middleware stage
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.add(middleware);
        self
    }

    /// Register a route
    pub fn route(mut self, method: Method, path: impl Into<String>, handler: Handler) -> Self {
        self.routes.push((method, path.into(), handler));
        self
    }

    /// Register a GET route
    pub fn get(self, path: impl Into<String>, handler: Handler) -> Self {
        self.route(Method::GET, path, handler)
    }

    /// Register a POST route
    pub fn post(self, path: impl Into<String>, handler: Handler) -> Self {
        self.route(Method::POST, path, handler)
    }

    /// Replace the not-found fallback
    pub fn fallback(mut self, fallback: impl Fn(&Request) -> Error + Send + Sync + 'static) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    /// Freeze the pipeline
    pub fn build(self) -> Result<App> {
        let mut routes = Routes::new();
        for (method, path, handler) in self.routes {
            routes.add(&method, &path, handler)?;
        }

        Ok(App {
            middleware: self.middleware,
            routes,
            fallback: self.fallback,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The salute API: JSON formatter, text/JSON/form decoders, `GET /`, 404 fallback
pub fn build_app() -> Result<App> {
    App::builder()
        .middleware(JsonFormat)
        .middleware(TextBody)
        .middleware(JsonBody)
        .middleware(FormBody)
        .get("/", handler(handlers::hello))
        .fallback(handlers::not_found)
        .build()
}
