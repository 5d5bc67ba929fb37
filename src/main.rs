use tracing_subscriber::{EnvFilter, fmt};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let http_port = std::env::var("CLAIMGATE_HTTP_PORT").unwrap_or_else(|_| "7070".to_string());
    let api_base = std::env::var("CLAIMGATE_API_BASE").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    info!(
        target: "claimgate",
        "Claimgate starting: RUST_LOG='{}', http_port={}, claims_api_base='{}'",
        rust_log, http_port, api_base
    );

    claimgate::server::run().await
}
