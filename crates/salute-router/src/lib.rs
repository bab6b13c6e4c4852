//! salute-router: Zero-dependency exact-match route table
//!
//! Maps `(method, path)` pairs to handler IDs. The route table is built once
//! at startup and only read afterwards, so lookups need no synchronization.
//!
//! ## Matching
//! - Literal paths only: `/`, `/users`, `/api/v1/health`
//! - Methods are upper-cased at registration; request methods match exactly
//! - One trailing slash is ignored, so `/users/` matches `/users`
//! - `HEAD` falls back to the `GET` route for the same path
//!
//! ## Example
//! ```
//! use salute_router::Router;
//!
//! let mut router = Router::new();
//! router.insert("GET", "/", 0).unwrap();
//! router.insert("POST", "/users", 1).unwrap();
//!
//! assert_eq!(router.find("GET", "/").unwrap().handler_id, 0);
//! assert_eq!(router.find("HEAD", "/").unwrap().handler_id, 0);
//! assert!(router.find("GET", "/users").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;

/// Route match result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// The matched handler ID
    pub handler_id: u32,
}

/// Errors raised while registering routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Path does not start with `/`
    InvalidPath(String),
    /// Path contains a parameter or wildcard segment
    Pattern(String),
    /// The (method, path) pair is already registered
    Duplicate { method: String, path: String },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidPath(path) => write!(f, "route path must start with '/': {}", path),
            RouteError::Pattern(path) => {
                write!(f, "route path must be a literal (no ':' or '*' segments): {}", path)
            }
            RouteError::Duplicate { method, path } => {
                write!(f, "route already registered: {} {}", method, path)
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// Exact-match HTTP route table
///
/// Routes are organized by HTTP method for O(1) method dispatch,
/// then by normalized path for O(1) lookup.
#[derive(Debug, Default)]
pub struct Router {
    /// Method -> normalized path -> handler ID
    tables: HashMap<String, HashMap<String, u32>>,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, etc.)
    /// * `path` - Literal URL path, starting with `/`
    /// * `handler_id` - Identifier for the handler
    pub fn insert(&mut self, method: &str, path: &str, handler_id: u32) -> Result<(), RouteError> {
        if !path.starts_with('/') {
            return Err(RouteError::InvalidPath(path.to_string()));
        }
        if path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
        {
            return Err(RouteError::Pattern(path.to_string()));
        }

        let method = method.to_uppercase();
        let key = normalize(path).to_string();
        let table = self.tables.entry(method.clone()).or_default();
        if table.contains_key(&key) {
            return Err(RouteError::Duplicate {
                method,
                path: path.to_string(),
            });
        }
        table.insert(key, handler_id);
        Ok(())
    }

    /// Find a matching route
    ///
    /// Returns `None` when no route is registered for the pair, which lets
    /// the caller hand the request to its fallback.
    pub fn find(&self, method: &str, path: &str) -> Option<Match> {
        let key = normalize(path);

        let found = self.lookup(method, key);
        if found.is_none() && method == "HEAD" {
            return self.lookup("GET", key);
        }
        found
    }

    fn lookup(&self, method: &str, key: &str) -> Option<Match> {
        self.tables
            .get(method)?
            .get(key)
            .map(|&handler_id| Match { handler_id })
    }

    /// Total number of registered routes
    pub fn len(&self) -> usize {
        self.tables.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop one trailing slash from anything longer than `/`.
fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else if path.is_empty() {
        "/"
    } else {
        path
    }
}
