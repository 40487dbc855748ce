use core_config::ConfigError;
use mongodb::{
    Client,
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
};
use std::time::Duration;
use tracing::info;

use super::MongoConfig;

/// Error type for MongoDB operations
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Connect to MongoDB and return a verified Client
///
/// # Arguments
/// * `url` - MongoDB connection string (e.g., "mongodb://localhost:27017")
///
/// # Example
/// ```ignore
/// use database::mongodb::connect;
///
/// let client = connect("mongodb://localhost:27017").await?;
/// let db = client.database("main");
/// ```
pub async fn connect(url: &str) -> Result<Client, MongoError> {
    connect_from_config(&MongoConfig::new(url)).await
}

/// Connect using a MongoConfig
///
/// The client is pinned to Stable API version 1 and the handshake is verified
/// with a `ping` against `admin` before the client is handed out, so an
/// unreachable or unauthenticated deployment is reported here rather than on
/// first use.
///
/// # Example
/// ```ignore
/// use database::mongodb::{MongoConfig, connect_from_config};
/// use core_config::FromEnv;
///
/// let config = MongoConfig::from_env()?;
/// let client = connect_from_config(&config).await?;
/// ```
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    info!("Attempting to connect to MongoDB at {}", config.redacted_url());

    let options = client_options(config).await?;
    let client = Client::with_options(options)?;

    // Verify connection
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}

/// Parse the connection string and apply the configured overrides.
///
/// No I/O happens here beyond SRV/TXT lookups for `mongodb+srv` URLs.
pub(crate) async fn client_options(config: &MongoConfig) -> Result<ClientOptions, MongoError> {
    let mut options = ClientOptions::parse(&config.url).await?;

    options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

    if let Some(secs) = config.connect_timeout_secs {
        options.connect_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(secs) = config.server_selection_timeout_secs {
        options.server_selection_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    Ok(options)
}
