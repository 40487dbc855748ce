//! Shared test utilities
//!
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo")
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::TestMongo;
//!
//! #[tokio::test]
//! #[ignore] // Requires Docker
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let client = mongodb::Client::with_uri_str(mongo.connection_string())
//!         .await
//!         .unwrap();
//! }
//! ```

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;
