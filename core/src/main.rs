use std::sync::Arc;

use erc20_ledger_host::config::load_config;
use erc20_ledger_host::server::router;
use erc20_ledger_host::LedgerHost;
use erc20_token_contract::Token;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // -------------------------------
    // Load configuration
    // -------------------------------
    let config = load_config()?;

    // -------------------------------
    // Initialize Tracing / Logging
    // -------------------------------
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("ERC20 ledger host initialized with config: {:?}", config);

    // -------------------------------
    // Ledger Setup
    // -------------------------------
    let host = Arc::new(LedgerHost::new(Token::with_minter(&config.minter_msp_id)));
    tracing::info!("Minting organization: {}", host.token().minter_msp_id());

    let app = router(host);

    // -------------------------------
    // Run Server
    // -------------------------------
    let bind_addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    let local_addr = listener.local_addr()?;
    tracing::info!("Server listening on http://{}", local_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", local_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
