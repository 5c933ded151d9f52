//! `parlord` — the Parlor session coordination daemon.

use parlor::{Config, ServerBuilder, ServerError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        env = ?config.env,
        ttl_secs = config.ttl.as_secs(),
        "starting parlord"
    );

    let server = ServerBuilder::from_config(&config).build().await?;
    server.run().await
}
