//! End-to-end tests over a real socket.
//!
//! Each test binds the server on an ephemeral loopback port and talks to it
//! with hyper's HTTP/1.1 client connection.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::HeaderMap;
use hyper::StatusCode;
use hyper_util::rt::TokioIo;
use salute_core::{build_app, Server, ServerConfig};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<salute_core::Result<()>>,
}

async fn start_with(config: ServerConfig) -> TestServer {
    let server = Server::bind(config, build_app().unwrap()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run_until(async {
        let _ = rx.await;
    }));
    TestServer { addr, stop, handle }
}

async fn start() -> TestServer {
    start_with(
        ServerConfig::new()
            .port(0)
            .shutdown_timeout(Duration::from_secs(1)),
    )
    .await
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Reply {
    fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    content_type: Option<&str>,
    body: impl Into<Bytes>,
) -> Reply {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .unwrap();
    tokio::spawn(conn);

    let mut builder = hyper::Request::builder()
        .method(method)
        .uri(path)
        .header("host", addr.to_string());
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    let req = builder.body(Full::new(body.into())).unwrap();

    let res = sender.send_request(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = res.into_body().collect().await.unwrap().to_bytes();

    Reply {
        status,
        headers,
        body,
    }
}

#[tokio::test]
async fn get_root_returns_greeting() {
    let server = start().await;

    let reply = send(server.addr, "GET", "/", None, Bytes::new()).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers["content-type"], "application/json");
    assert_eq!(reply.headers.get_all("content-type").iter().count(), 1);
    assert_eq!(reply.json(), serde_json::json!({ "message": "Hello World!" }));
}

#[tokio::test]
async fn post_unknown_is_not_found() {
    let server = start().await;

    let reply = send(server.addr, "POST", "/unknown", None, Bytes::new()).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.headers["content-type"], "application/json");
    assert_eq!(reply.json(), serde_json::json!({ "error": "Not Found: POST:/unknown" }));
}

#[tokio::test]
async fn any_other_route_is_not_found() {
    let server = start().await;

    for (method, uri, path) in [
        ("GET", "/hello", "/hello"),
        ("PUT", "/", "/"),
        ("DELETE", "/a/b/c", "/a/b/c"),
        ("PATCH", "/items", "/items"),
        ("GET", "/search?q=rust", "/search"),
    ] {
        let reply = send(server.addr, method, uri, None, Bytes::new()).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert_eq!(
            reply.json()["error"],
            format!("Not Found: {}:{}", method, path)
        );
    }
}

#[tokio::test]
async fn head_root_has_no_body() {
    let server = start().await;

    let reply = send(server.addr, "HEAD", "/", None, Bytes::new()).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn malformed_json_is_client_error() {
    let server = start().await;

    let reply = send(
        server.addr,
        "POST",
        "/unknown",
        Some("application/json"),
        "{\"unterminated\": ",
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let message = reply.json()["error"].as_str().unwrap().to_string();
    assert!(message.starts_with("Malformed JSON body"), "{}", message);

    // Server keeps serving after a rejected body
    let reply = send(server.addr, "GET", "/", None, Bytes::new()).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_get_body_is_client_error() {
    let server = start().await;

    let reply = send(server.addr, "GET", "/x", Some("application/json"), "{bad").await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let message = reply.json()["error"].as_str().unwrap().to_string();
    assert!(message.starts_with("Malformed JSON body"), "{}", message);
}

#[tokio::test]
async fn doubled_slash_is_not_root() {
    let server = start().await;

    let reply = send(server.addr, "GET", "//", None, Bytes::new()).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json(), serde_json::json!({ "error": "Not Found: GET://" }));
}

#[tokio::test]
async fn well_formed_bodies_reach_the_fallback() {
    let server = start().await;

    for (content_type, body) in [
        ("application/json", r#"{"a":[1,2,3]}"#),
        ("text/plain; charset=utf-8", "plain words"),
        ("application/x-www-form-urlencoded", "a=1&b=two"),
    ] {
        let reply = send(server.addr, "POST", "/submit", Some(content_type), body).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{}", content_type);
    }
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = start_with(ServerConfig::new().port(0).max_body_size(32)).await;

    let reply = send(
        server.addr,
        "POST",
        "/",
        Some("text/plain"),
        vec![b'x'; 1024],
    )
    .await;

    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(reply.json()["error"].as_str().unwrap().contains("32 bytes"));
}

#[tokio::test]
async fn binds_port_from_environment() {
    let port = {
        let reserved = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        reserved.local_addr().unwrap().port()
    };

    let config = ServerConfig::from_lookup(|key| (key == "PORT").then(|| port.to_string()));
    assert_eq!(config.port, port);

    let server = start_with(config).await;
    assert_eq!(server.addr.port(), port);
    assert!(server.addr.ip().is_loopback());

    let reply = send(server.addr, "GET", "/", None, Bytes::new()).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn shutdown_stops_accepting() {
    let server = start().await;
    let addr = server.addr;

    // An idle keep-alive connection must not block shutdown
    let stream = TcpStream::connect(addr).await.unwrap();
    let (_sender, conn) = hyper::client::conn::http1::handshake::<_, Full<Bytes>>(TokioIo::new(stream))
        .await
        .unwrap();
    tokio::spawn(conn);

    server.stop.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop in time")
        .unwrap();
    assert!(result.is_ok());

    assert!(TcpStream::connect(addr).await.is_err());
}
