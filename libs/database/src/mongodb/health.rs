use mongodb::{
    Client,
    bson::doc,
    error::{Error, ErrorKind},
};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::debug;

/// Prefix carried by every failure rendering of [`HealthStatus`]
pub const ERROR_MARKER: &str = "---ERROR---";

/// Why a liveness check failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PingFailure {
    /// The server could not be reached: selection timed out, the socket
    /// failed, DNS did not resolve or the pool was cleared.
    #[error("{0}")]
    Connectivity(String),

    /// The server answered but the command failed (auth, command error, ...)
    #[error("{0}")]
    Other(String),
}

impl PingFailure {
    pub fn detail(&self) -> &str {
        match self {
            PingFailure::Connectivity(detail) | PingFailure::Other(detail) => detail,
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, PingFailure::Connectivity(_))
    }
}

impl From<Error> for PingFailure {
    fn from(err: Error) -> Self {
        if is_connectivity_error(&err) {
            PingFailure::Connectivity(err.to_string())
        } else {
            PingFailure::Other(err.to_string())
        }
    }
}

/// Result of a health check
///
/// `Display` renders the human-readable messages; match on the variants for
/// anything programmatic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum HealthStatus {
    /// The manager never completed its handshake; nothing was sent
    Uninitialized,
    /// The server answered the ping
    Healthy,
    /// The ping was sent and failed
    Unhealthy(PingFailure),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl From<Result<(), PingFailure>> for HealthStatus {
    fn from(result: Result<(), PingFailure>) -> Self {
        match result {
            Ok(()) => HealthStatus::Healthy,
            Err(failure) => HealthStatus::Unhealthy(failure),
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Uninitialized => f.write_str("Database connection not initialized."),
            HealthStatus::Healthy => f.write_str("Database connection successful!"),
            HealthStatus::Unhealthy(PingFailure::Connectivity(detail)) => {
                write!(f, "{ERROR_MARKER} Database connection failed: {detail}")
            }
            HealthStatus::Unhealthy(PingFailure::Other(detail)) => {
                write!(f, "{ERROR_MARKER} Database command failed: {detail}")
            }
        }
    }
}

/// Health check with timing information
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    #[serde(flatten)]
    pub status: HealthStatus,
    /// Logical database the check was made for; `None` when uninitialized
    pub database: Option<String>,
    /// Round-trip time in milliseconds (0 when nothing was sent)
    pub response_time_ms: u64,
}

/// Send `{ ping: 1 }` to the `admin` database
///
/// # Example
/// ```ignore
/// use database::mongodb::{connect, ping};
///
/// let client = connect("mongodb://localhost:27017").await?;
/// ping(&client).await?;
/// ```
pub async fn ping(client: &Client) -> Result<(), PingFailure> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
        .map_err(|e| {
            let failure = PingFailure::from(e);
            debug!(connectivity = failure.is_connectivity(), "MongoDB ping failed: {}", failure);
            failure
        })
}

/// Check MongoDB health with a simple ping command
pub async fn check_health(client: &Client) -> bool {
    ping(client).await.is_ok()
}

/// Check MongoDB health with detailed status
///
/// Returns timing information and any error messages. `database` is the
/// logical database the caller is bound to and is echoed into the report.
///
/// # Example
/// ```ignore
/// use database::mongodb::{connect, check_health_detailed};
///
/// let client = connect("mongodb://localhost:27017").await?;
/// let report = check_health_detailed(&client, "main").await;
/// println!("{} ({}ms)", report.status, report.response_time_ms);
/// ```
pub async fn check_health_detailed(client: &Client, database: &str) -> HealthReport {
    let start = Instant::now();
    let status = HealthStatus::from(ping(client).await);

    HealthReport {
        status,
        database: Some(database.to_string()),
        response_time_ms: start.elapsed().as_millis() as u64,
    }
}

/// Whether a driver error means the deployment could not be reached
fn is_connectivity_error(err: &Error) -> bool {
    is_connectivity_kind(err.kind.as_ref())
}

fn is_connectivity_kind(kind: &ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_fixed_messages() {
        assert_eq!(
            HealthStatus::Uninitialized.to_string(),
            "Database connection not initialized."
        );
        assert_eq!(
            HealthStatus::Healthy.to_string(),
            "Database connection successful!"
        );
    }

    #[test]
    fn test_display_connectivity_failure() {
        let status = HealthStatus::Unhealthy(PingFailure::Connectivity("timed out".into()));
        assert_eq!(
            status.to_string(),
            "---ERROR--- Database connection failed: timed out"
        );
        assert!(status.to_string().starts_with(ERROR_MARKER));
    }

    #[test]
    fn test_display_other_failure() {
        let status = HealthStatus::Unhealthy(PingFailure::Other("auth failed".into()));
        assert_eq!(
            status.to_string(),
            "---ERROR--- Database command failed: auth failed"
        );
    }

    #[test]
    fn test_status_from_result() {
        assert_eq!(HealthStatus::from(Ok(())), HealthStatus::Healthy);
        let status = HealthStatus::from(Err(PingFailure::Other("x".into())));
        assert!(!status.is_healthy());
        assert_eq!(status, HealthStatus::Unhealthy(PingFailure::Other("x".into())));
    }

    #[test]
    fn test_ping_failure_accessors() {
        let failure = PingFailure::Connectivity("refused".into());
        assert!(failure.is_connectivity());
        assert_eq!(failure.detail(), "refused");
        assert!(!PingFailure::Other("nope".into()).is_connectivity());
    }

    #[test]
    fn test_io_error_is_connectivity() {
        let err = Error::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ));
        let failure = PingFailure::from(err);
        assert!(failure.is_connectivity());
        assert!(failure.detail().contains("connection reset by peer"));
    }

    #[test]
    fn test_custom_error_is_other() {
        let failure = PingFailure::from(Error::custom("unexpected"));
        assert!(!failure.is_connectivity());
    }

    #[test]
    fn test_serialize_status() {
        let healthy = serde_json::to_value(HealthStatus::Healthy).unwrap();
        assert_eq!(healthy, serde_json::json!({ "status": "healthy" }));

        let unhealthy = serde_json::to_value(HealthStatus::Unhealthy(
            PingFailure::Connectivity("down".into()),
        ))
        .unwrap();
        assert_eq!(
            unhealthy,
            serde_json::json!({
                "status": "unhealthy",
                "error": { "kind": "connectivity", "detail": "down" }
            })
        );
    }

    #[test]
    fn test_serialize_report_flattens_status() {
        let report = HealthReport {
            status: HealthStatus::Uninitialized,
            database: None,
            response_time_ms: 0,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "uninitialized");
        assert_eq!(value["response_time_ms"], 0);
        assert!(value["database"].is_null());
    }

    #[tokio::test]
    async fn test_ping_unreachable_is_connectivity() {
        // Client construction does no I/O; the ping has to select a server.
        let client = Client::with_uri_str(
            "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=300&connectTimeoutMS=300",
        )
        .await
        .unwrap();

        let failure = ping(&client).await.unwrap_err();
        assert!(failure.is_connectivity(), "unexpected failure: {failure:?}");
        assert!(!check_health(&client).await);
    }

    #[tokio::test]
    async fn test_check_health_detailed_unreachable() {
        let client = Client::with_uri_str("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=300")
            .await
            .unwrap();

        let report = check_health_detailed(&client, "main").await;
        assert_eq!(report.database.as_deref(), Some("main"));
        assert!(matches!(
            report.status,
            HealthStatus::Unhealthy(PingFailure::Connectivity(_))
        ));
    }
}
