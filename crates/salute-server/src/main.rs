//! salute - minimal HTTP JSON API
//!
//! Binds `127.0.0.1:$PORT` (default 5000) and serves:
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | GET | `/` | `200 {"message":"Hello World!"}` |
//! | any | other | `404 {"error":"Not Found: METHOD:PATH"}` |
//!
//! # Usage
//!
//! ```text
//! PORT=8080 RUST_LOG=debug salute
//! ```

use salute_core::{build_app, Server, ServerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,salute=debug,salute_core=debug")),
        )
        .init();

    let config = ServerConfig::from_env();
    let app = build_app()?;

    let server = Server::bind(config, app).await?;
    info!(addr = %server.local_addr()?, "salute ready");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            info!("ctrl-c received");
        })
        .await?;

    info!("salute stopped");
    Ok(())
}
