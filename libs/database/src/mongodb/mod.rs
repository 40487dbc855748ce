//! MongoDB database connector and utilities
//!
//! Provides connection management and MongoDB-specific helpers.

mod config;
mod connector;
mod health;
mod manager;

pub use config::{CONNECTION_STRING_ENV, MongoConfig};
pub use connector::{MongoError, connect, connect_from_config};
pub use health::{
    ERROR_MARKER, HealthReport, HealthStatus, PingFailure, check_health, check_health_detailed,
    ping,
};
pub use manager::{ConnectionManager, ConnectionState, MAIN_DATABASE, MongoConnection};

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
