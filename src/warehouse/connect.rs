// ABOUTME: TLS connection handling for the warehouse
// ABOUTME: Requires encrypted transport and spawns the connection driver

use anyhow::{Context, Result};
use postgres_native_tls::MakeTlsConnector;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::Client;

use crate::config::WarehouseConfig;

/// Open a read-only warehouse connection over TLS.
///
/// Transport encryption is required, never preferred. The connection
/// driver runs on a spawned task and finishes when the returned client
/// is dropped, so holding the client in a scope gives deterministic
/// release on every exit path.
pub async fn connect(config: &WarehouseConfig) -> Result<Client> {
    let tls = native_tls::TlsConnector::new().context("Failed to build TLS connector")?;
    let tls = MakeTlsConnector::new(tls);

    let mut pg_config = tokio_postgres::Config::new();
    pg_config
        .host(&config.host)
        .port(config.port)
        .dbname(&config.database)
        .user(&config.user)
        .password(&config.password)
        .ssl_mode(SslMode::Require)
        .connect_timeout(Duration::from_secs(30));

    let (client, connection) = pg_config
        .connect(tls)
        .await
        .with_context(|| format!("Failed to connect to warehouse at {}", config.host))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::warn!("Warehouse connection error: {}", e);
        }
    });

    tracing::debug!(
        "Connected to warehouse {}:{}/{}",
        config.host,
        config.port,
        config.database
    );

    Ok(client)
}
