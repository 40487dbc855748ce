//! Rendering of health results for the terminal.

use clap::ValueEnum;
use database::mongodb::{ConnectionManager, ConnectionState, HealthReport};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable messages
    Text,
    /// One JSON object per line
    Json,
}

/// Snapshot of what construction produced
#[derive(Debug, Serialize)]
pub struct StateReport {
    pub state: &'static str,
    pub database: Option<String>,
    pub error: Option<String>,
}

impl StateReport {
    pub fn from_manager(manager: &ConnectionManager) -> Self {
        match manager.state() {
            ConnectionState::Ready(connection) => Self {
                state: "ready",
                database: Some(connection.database().name().to_string()),
                error: None,
            },
            ConnectionState::Uninitialized(err) => Self {
                state: "uninitialized",
                database: None,
                error: Some(err.to_string()),
            },
        }
    }
}

pub fn render_ping(report: &HealthReport, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(report.status.to_string()),
        OutputFormat::Json => serde_json::to_string(report),
    }
}

pub fn render_state(
    manager: &ConnectionManager,
    format: OutputFormat,
) -> serde_json::Result<String> {
    let state = StateReport::from_manager(manager);

    match format {
        OutputFormat::Text => Ok(match (&state.database, &state.error) {
            (Some(database), _) => format!("Connected to MongoDB database '{database}'"),
            (None, Some(error)) => format!("Not connected: {error}"),
            (None, None) => "Not connected".to_string(),
        }),
        OutputFormat::Json => serde_json::to_string(&state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::mongodb::{HealthStatus, PingFailure};

    fn report(status: HealthStatus) -> HealthReport {
        HealthReport {
            status,
            database: Some("main".to_string()),
            response_time_ms: 12,
        }
    }

    #[test]
    fn test_render_ping_text() {
        let line = render_ping(&report(HealthStatus::Healthy), OutputFormat::Text).unwrap();
        assert_eq!(line, "Database connection successful!");

        let line = render_ping(
            &report(HealthStatus::Unhealthy(PingFailure::Connectivity("refused".into()))),
            OutputFormat::Text,
        )
        .unwrap();
        assert_eq!(line, "---ERROR--- Database connection failed: refused");
    }

    #[test]
    fn test_render_ping_json() {
        let line = render_ping(&report(HealthStatus::Healthy), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["database"], "main");
        assert_eq!(value["response_time_ms"], 12);
    }

    #[tokio::test]
    async fn test_render_state_ready() {
        let client = database::mongodb::Client::with_uri_str("mongodb://127.0.0.1:1")
            .await
            .unwrap();
        let manager = ConnectionManager::from_client(client);

        assert_eq!(
            render_state(&manager, OutputFormat::Text).unwrap(),
            "Connected to MongoDB database 'main'"
        );

        let value: serde_json::Value =
            serde_json::from_str(&render_state(&manager, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(value["state"], "ready");
        assert!(value["error"].is_null());
    }
}
