//! Fallback for unmatched requests

use crate::{Error, Request};

/// Build the 404 error for a request no route matched
///
/// The message is `Not Found: <METHOD>:<PATH>`, e.g. `Not Found: POST:/unknown`.
pub fn not_found(req: &Request) -> Error {
    Error::not_found(req.method.as_str(), req.path.as_str())
}
