//! Body decoder middleware
//!
//! Three decoders, one per media type. Each one only acts when the request's
//! content type names its media type and the body is non-empty; otherwise it
//! passes the request through untouched. A body is decoded at most once.

use super::{Middleware, Next};
use crate::error::{BodyKind, Error};
use crate::request::DecodedBody;
use crate::{Request, Response, Result};

pub const MEDIA_TEXT: &str = "text/plain";
pub const MEDIA_JSON: &str = "application/json";
pub const MEDIA_FORM: &str = "application/x-www-form-urlencoded";

fn decode_if(
    req: &mut Request,
    media: &str,
    decode: impl FnOnce(&[u8]) -> Result<DecodedBody>,
) -> Result<Next> {
    if req.decoded.is_some() || req.body.is_empty() {
        return Ok(Next::Continue);
    }
    if req.media_type().as_deref() != Some(media) {
        return Ok(Next::Continue);
    }

    match decode(&req.body) {
        Ok(decoded) => {
            req.decoded = Some(decoded);
            Ok(Next::Continue)
        }
        Err(e) => {
            tracing::debug!(media, path = %req.path, error = %e, "rejecting body");
            Err(e)
        }
    }
}

/// Decodes `text/plain` bodies as UTF-8
#[derive(Debug, Clone, Copy, Default)]
pub struct TextBody;

impl Middleware for TextBody {
    fn name(&self) -> &'static str {
        "text-body"
    }

    fn handle(&self, req: &mut Request, _res: &mut Response) -> Result<Next> {
        decode_if(req, MEDIA_TEXT, |bytes| {
            std::str::from_utf8(bytes)
                .map(|text| DecodedBody::Text(text.to_string()))
                .map_err(|e| Error::malformed(BodyKind::Text, e))
        })
    }
}

/// Decodes `application/json` bodies into a `serde_json::Value`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody;

impl Middleware for JsonBody {
    fn name(&self) -> &'static str {
        "json-body"
    }

    fn handle(&self, req: &mut Request, _res: &mut Response) -> Result<Next> {
        decode_if(req, MEDIA_JSON, |bytes| {
            serde_json::from_slice(bytes)
                .map(DecodedBody::Json)
                .map_err(|e| Error::malformed(BodyKind::Json, e))
        })
    }
}

/// Decodes `application/x-www-form-urlencoded` bodies into ordered pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct FormBody;

impl Middleware for FormBody {
    fn name(&self) -> &'static str {
        "form-body"
    }

    fn handle(&self, req: &mut Request, _res: &mut Response) -> Result<Next> {
        decode_if(req, MEDIA_FORM, |bytes| {
            std::str::from_utf8(bytes).map_err(|e| Error::malformed(BodyKind::Form, e))?;
            let pairs = url::form_urlencoded::parse(bytes).into_owned().collect();
            Ok(DecodedBody::Form(pairs))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Method, RequestBuilder, StatusCode};

    fn post(content_type: &str, body: &'static [u8]) -> Request {
        RequestBuilder::new(Method::POST, "/")
            .header("Content-Type", content_type)
            .body(body)
            .build()
    }

    fn run_all(req: &mut Request) -> Result<Next> {
        let mut res = Response::ok();
        TextBody.handle(req, &mut res)?;
        JsonBody.handle(req, &mut res)?;
        FormBody.handle(req, &mut res)
    }

    #[test]
    fn test_json_body() {
        let mut req = post("application/json; charset=utf-8", br#"{"a":[1,2,{"b":null}]}"#);
        run_all(&mut req).unwrap();

        assert_eq!(
            req.json(),
            Some(&serde_json::json!({ "a": [1, 2, { "b": null }] }))
        );
    }

    #[test]
    fn test_malformed_json() {
        let mut req = post("application/json", b"{\"a\":");
        let err = run_all(&mut req).unwrap_err();

        assert!(matches!(err, Error::MalformedBody { kind: BodyKind::Json, .. }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(req.decoded.is_none());
    }

    #[test]
    fn test_text_body() {
        let mut req = post("text/plain", b"hello there");
        run_all(&mut req).unwrap();
        assert_eq!(req.text(), Some("hello there"));
    }

    #[test]
    fn test_invalid_utf8_text() {
        let mut req = post("text/plain", &[0xff, 0xfe]);
        let err = run_all(&mut req).unwrap_err();
        assert!(matches!(err, Error::MalformedBody { kind: BodyKind::Text, .. }));
    }

    #[test]
    fn test_invalid_utf8_form() {
        let mut req = post("application/x-www-form-urlencoded", &[b'a', b'=', 0xff]);
        let err = run_all(&mut req).unwrap_err();

        assert!(matches!(err, Error::MalformedBody { kind: BodyKind::Form, .. }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(req.decoded.is_none());
    }

    #[test]
    fn test_form_body() {
        let mut req = post("application/x-www-form-urlencoded", b"name=Jane+Doe&city=S%C3%A3o%20Paulo&x=");
        run_all(&mut req).unwrap();

        assert_eq!(req.form_value("name"), Some("Jane Doe"));
        assert_eq!(req.form_value("city"), Some("São Paulo"));
        assert_eq!(req.form_value("x"), Some(""));
    }

    #[test]
    fn test_non_matching_type_is_noop() {
        let mut req = post("application/octet-stream", b"{not json");
        assert_eq!(run_all(&mut req).unwrap(), Next::Continue);
        assert!(req.decoded.is_none());

        // No content-type at all
        let mut req = RequestBuilder::new(Method::POST, "/").body("{").build();
        run_all(&mut req).unwrap();
        assert!(req.decoded.is_none());
    }

    #[test]
    fn test_empty_body_is_noop() {
        let mut req = post("application/json", b"");
        run_all(&mut req).unwrap();
        assert!(req.decoded.is_none());
    }

    #[test]
    fn test_decodes_once() {
        let mut req = post("application/json", b"[1]");
        req.decoded = Some(DecodedBody::Text("already".to_string()));

        run_all(&mut req).unwrap();
        assert_eq!(req.text(), Some("already"));
    }
}
