//! Response format middleware
//!
//! Marks every response as JSON before any handler runs.

use super::{Middleware, Next};
use crate::{Request, Response, Result};

/// Sets `content-type: application/json` on the draft response
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Middleware for JsonFormat {
    fn name(&self) -> &'static str {
        "json-format"
    }

    fn handle(&self, _req: &mut Request, res: &mut Response) -> Result<Next> {
        res.set_header("content-type", "application/json");
        Ok(Next::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Method, ResponseBuilder, StatusCode};

    #[test]
    fn test_sets_content_type() {
        let mut req = Request::new(Method::GET, "/");
        let mut res = Response::ok();

        assert_eq!(JsonFormat.handle(&mut req, &mut res).unwrap(), Next::Continue);
        assert_eq!(res.content_type(), Some("application/json"));
    }

    #[test]
    fn test_idempotent() {
        let mut req = Request::new(Method::GET, "/");
        let mut res = ResponseBuilder::new(StatusCode::OK)
            .header("Content-Type", "text/plain")
            .body("hi")
            .build();

        JsonFormat.handle(&mut req, &mut res).unwrap();
        JsonFormat.handle(&mut req, &mut res).unwrap();

        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.content_type(), Some("application/json"));
    }
}
