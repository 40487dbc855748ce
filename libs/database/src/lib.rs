//! MongoDB connection management and health checks
//!
//! The central type is [`mongodb::ConnectionManager`]: it is constructed once,
//! reads its connection string from the `database-connection-string`
//! environment variable, selects the `main` logical database and reports
//! liveness on demand through a typed [`mongodb::HealthStatus`].
//!
//! Construction never fails outright. A manager whose handshake failed stays
//! [`mongodb::ConnectionState::Uninitialized`] and keeps the reason around, so
//! callers branch on the state instead of catching errors.
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{ConnectionManager, HealthStatus};
//!
//! let manager = ConnectionManager::initialize().await;
//!
//! match manager.ping().await {
//!     HealthStatus::Healthy => println!("{}", HealthStatus::Healthy),
//!     status => eprintln!("{status}"),
//! }
//!
//! if let Some(db) = manager.database() {
//!     let users = db.collection::<Document>("users");
//! }
//! ```

pub mod mongodb;

pub use crate::mongodb::{ConnectionManager, HealthStatus, MongoError, PingFailure};
