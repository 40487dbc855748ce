use core_config::FromEnv;
use mongodb::{Client, Database};
use tracing::{debug, error, info};

use super::connector::{MongoError, connect_from_config};
use super::health::{self, HealthReport, HealthStatus};
use super::{ERROR_MARKER, MongoConfig};

/// Logical database every manager is bound to
pub const MAIN_DATABASE: &str = "main";

/// A verified client together with its `main` database handle
#[derive(Debug, Clone)]
pub struct MongoConnection {
    client: Client,
    database: Database,
}

impl MongoConnection {
    fn new(client: Client) -> Self {
        let database = client.database(MAIN_DATABASE);
        Self { client, database }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

/// Where a manager ended up after construction
///
/// Fixed for the lifetime of the manager: a failed ping on a `Ready`
/// connection does not move it back to `Uninitialized`.
#[derive(Debug)]
pub enum ConnectionState {
    Ready(MongoConnection),
    /// The handshake never completed; holds the reason
    Uninitialized(MongoError),
}

/// Long-lived owner of the process's MongoDB connection
///
/// Build it once at startup and hand out `&ConnectionManager` (or an `Arc`)
/// to whatever needs the database. Construction never fails: when the
/// connection string is missing or the server cannot be reached, the failure
/// is logged and the manager stays [`ConnectionState::Uninitialized`].
///
/// # Example
///
/// ```ignore
/// use database::mongodb::ConnectionManager;
///
/// let manager = ConnectionManager::initialize().await;
/// println!("{}", manager.ping().await);
/// ```
#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
}

impl ConnectionManager {
    /// Connect using the `database-connection-string` environment variable
    pub async fn initialize() -> Self {
        match MongoConfig::from_env() {
            Ok(config) => Self::connect(&config).await,
            Err(e) => Self::uninitialized(e.into()),
        }
    }

    /// Connect using an explicit config, degrading to `Uninitialized` on failure
    pub async fn connect(config: &MongoConfig) -> Self {
        match Self::try_connect(config).await {
            Ok(manager) => manager,
            Err(e) => Self::uninitialized(e),
        }
    }

    /// Connect using an explicit config, returning the failure to the caller
    pub async fn try_connect(config: &MongoConfig) -> Result<Self, MongoError> {
        let client = connect_from_config(config).await?;
        Ok(Self::from_client(client))
    }

    /// Wrap an existing client without performing a handshake
    pub fn from_client(client: Client) -> Self {
        let connection = MongoConnection::new(client);
        info!("Using MongoDB database: {}", connection.database().name());

        Self {
            state: ConnectionState::Ready(connection),
        }
    }

    fn uninitialized(err: MongoError) -> Self {
        error!("{} Failed to connect to MongoDB: {}", ERROR_MARKER, err);

        Self {
            state: ConnectionState::Uninitialized(err),
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ConnectionState::Ready(_))
    }

    pub fn connection(&self) -> Option<&MongoConnection> {
        match &self.state {
            ConnectionState::Ready(connection) => Some(connection),
            ConnectionState::Uninitialized(_) => None,
        }
    }

    pub fn client(&self) -> Option<&Client> {
        self.connection().map(MongoConnection::client)
    }

    pub fn database(&self) -> Option<&Database> {
        self.connection().map(MongoConnection::database)
    }

    /// The reason construction failed, if it did
    pub fn init_error(&self) -> Option<&MongoError> {
        match &self.state {
            ConnectionState::Ready(_) => None,
            ConnectionState::Uninitialized(err) => Some(err),
        }
    }

    /// Check that the server is reachable
    ///
    /// Never sends anything when the manager is uninitialized. Driver failures
    /// come back as [`HealthStatus::Unhealthy`]; nothing is raised.
    pub async fn ping(&self) -> HealthStatus {
        match self.client() {
            Some(client) => HealthStatus::from(health::ping(client).await),
            None => {
                debug!("Skipping ping: connection not initialized");
                HealthStatus::Uninitialized
            }
        }
    }

    /// Like [`ping`](Self::ping), with round-trip time and database name
    pub async fn ping_detailed(&self) -> HealthReport {
        match self.connection() {
            Some(connection) => {
                health::check_health_detailed(connection.client(), connection.database().name())
                    .await
            }
            None => HealthReport {
                status: HealthStatus::Uninitialized,
                database: None,
                response_time_ms: 0,
            },
        }
    }
}
