//! Root greeting handler

use crate::{Request, Response, Result, StatusCode};
use serde::{Deserialize, Serialize};

/// Message sent by [`hello`]
pub const GREETING: &str = "Hello World!";

/// Payload of the root route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub message: String,
}

impl Default for Greeting {
    fn default() -> Self {
        Self {
            message: GREETING.to_string(),
        }
    }
}

/// `GET /` - always `200 {"message":"Hello World!"}`, whatever the request
pub async fn hello(_req: Request, mut res: Response) -> Result<Response> {
    res.status = StatusCode::OK;
    res.set_json(&Greeting::default())?;
    Ok(res)
}
