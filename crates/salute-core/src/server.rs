//! Native HTTP server implementation
//!
//! Serves an [`App`] over HTTP/1.1 using hyper with:
//! - Multi-threaded tokio runtime, one task per connection
//! - Request bodies collected up to `max_body_size`
//! - Graceful shutdown: stop accepting, let in-flight connections finish

use crate::{App, Error, Method, Request, Response, Result, ServerConfig};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// A bound, not yet serving, HTTP server
pub struct Server {
    listener: TcpListener,
    app: Arc<App>,
    config: ServerConfig,
    tracker: Arc<ConnectionTracker>,
}

impl Server {
    /// Bind the listening socket described by `config`
    pub async fn bind(config: ServerConfig, app: App) -> Result<Self> {
        let socket = create_optimized_socket(&config.addr())?;
        let listener = TcpListener::from_std(socket.into())?;

        info!(addr = %listener.local_addr()?, "listening");

        Ok(Self {
            listener,
            app: Arc::new(app),
            config,
            tracker: Arc::new(ConnectionTracker::new()),
        })
    }

    /// Address the server is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the process is terminated
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `signal` resolves, then drain in-flight connections
    pub async fn run_until<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Server {
            listener,
            app,
            config,
            tracker,
        } = self;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::pin!(signal);

        loop {
            tokio::select! {
                _ = &mut signal => break,
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(error = %e, "accept failed");
                            continue;
                        }
                    };

                    if let Err(e) = stream.set_nodelay(true) {
                        debug!(%peer, error = %e, "failed to set TCP_NODELAY");
                    }

                    let guard = ConnectionGuard::new(tracker.clone());
                    let app = app.clone();
                    let shutdown = shutdown_rx.clone();
                    let limit = config.max_body_size;

                    tokio::spawn(async move {
                        serve_connection(stream, peer, app, limit, shutdown).await;
                        drop(guard);
                    });
                }
            }
        }

        drop(listener);
        shutdown_tx.send_replace(true);

        info!(active = tracker.count(), "shutting down, draining connections");
        if tracker.drain(config.shutdown_timeout).await {
            info!("all connections closed");
        } else {
            warn!(
                active = tracker.count(),
                timeout = ?config.shutdown_timeout,
                "shutdown timeout reached with connections still open"
            );
        }

        Ok(())
    }
}

async fn serve_connection(
    stream: tokio::net::TcpStream,
    peer: SocketAddr,
    app: Arc<App>,
    limit: usize,
    mut shutdown: watch::Receiver<bool>,
) {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req| {
        let app = app.clone();
        async move { Ok::<_, Infallible>(handle_request(&app, req, limit).await) }
    });

    let conn = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(conn);

    let mut draining = false;
    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(e) = result {
                    debug!(%peer, error = %e, "connection error");
                }
                break;
            }
            _ = shutdown.changed(), if !draining => {
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

/// Run one hyper request through the app
pub async fn handle_request(
    app: &App,
    req: hyper::Request<Incoming>,
    limit: usize,
) -> hyper::Response<Full<Bytes>> {
    let res = match from_hyper_request(req, limit).await {
        Ok(request) => app.handle(request).await,
        Err(e) => app.handle_error(e),
    };
    to_hyper_response(res)
}

/// Create a TCP listening socket
pub fn create_optimized_socket(addr: &SocketAddr) -> std::io::Result<Socket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // SO_REUSEADDR - allow binding to address in TIME_WAIT
    socket.set_reuse_address(true)?;

    socket.bind(&(*addr).into())?;
    socket.listen(1024)?;

    // Required by tokio's from_std
    socket.set_nonblocking(true)?;

    Ok(socket)
}

/// Convert a hyper request into our Request, collecting the body
///
/// Bodies larger than `limit` (declared or actual) yield
/// [`Error::PayloadTooLarge`].
pub async fn from_hyper_request<B>(req: hyper::Request<B>, limit: usize) -> Result<Request>
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();

    let mut request = Request::new(parts.method, parts.uri.path());
    request.query = parts.uri.query().map(str::to_string);

    for (name, value) in &parts.headers {
        if let Ok(v) = value.to_str() {
            request.headers.push((name.to_string(), v.to_string()));
        }
    }

    // HEAD never carries a body
    if request.method == Method::HEAD {
        return Ok(request);
    }

    if request.content_length().is_some_and(|len| len > limit) {
        return Err(Error::PayloadTooLarge { limit });
    }

    let collected = Limited::new(body, limit).collect().await.map_err(|e| {
        if e.downcast_ref::<LengthLimitError>().is_some() {
            Error::PayloadTooLarge { limit }
        } else {
            Error::Internal(format!("failed to read request body: {}", e))
        }
    })?;
    request.body = collected.to_bytes();

    Ok(request)
}

/// Convert our Response to a hyper Response
pub fn to_hyper_response(res: Response) -> hyper::Response<Full<Bytes>> {
    let mut out = hyper::Response::new(Full::new(res.body));
    *out.status_mut() = http::StatusCode::from_u16(res.status.as_u16())
        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

    for (name, value) in &res.headers {
        match (
            http::HeaderName::from_bytes(name.as_bytes()),
            http::HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                out.headers_mut().append(name, value);
            }
            _ => warn!(header = %name, "dropping invalid response header"),
        }
    }

    out
}

// ============================================================================
// Connection Tracking for Graceful Shutdown
// ============================================================================

/// Tracks active connections for graceful shutdown
///
/// Counts active connections so shutdown can wait for them to drain.
#[derive(Debug)]
pub struct ConnectionTracker {
    /// Active connection count
    active: AtomicU64,
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTracker {
    /// Create a new connection tracker
    pub fn new() -> Self {
        Self {
            active: AtomicU64::new(0),
        }
    }

    /// Increment active connection count
    #[inline]
    pub fn increment(&self) {
        self.active.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement active connection count
    #[inline]
    pub fn decrement(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    /// Get current active connection count
    #[inline]
    pub fn count(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait until no connections remain or `timeout` elapses
    ///
    /// Returns true if all connections drained.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if self.count() == 0 {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Keeps a connection counted for as long as it lives
struct ConnectionGuard {
    tracker: Arc<ConnectionTracker>,
}

impl ConnectionGuard {
    fn new(tracker: Arc<ConnectionTracker>) -> Self {
        tracker.increment();
        Self { tracker }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.tracker.decrement();
    }
}
