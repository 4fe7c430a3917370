//! # influxq
//!
//! Client-side query construction and result mapping for a time-series
//! database spoken to over its HTTP query protocol.
//!
//! ## Features
//!
//! - **Statement builder**: composable SELECT statements rendered to query
//!   text with correct identifier quoting and escaping
//! - **Typed tables**: tabular wire responses validated into strongly-typed
//!   [`Table`] values, with strict single-series and row-shape checks
//! - **Scalar helpers**: one-column string extraction for `SHOW`-style
//!   commands
//! - **Admin commands**: create/drop databases and retention policies
//!
//! ## Modules
//!
//! - [`quote`]: identifier quoting/escaping rules
//! - [`statement`]: the SELECT statement model and renderer
//! - [`table`]: response-to-table mapping and validation
//! - [`client`]: the connection facade over the HTTP transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use influxq::{Client, ConnectionConfig, DataSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = ConnectionConfig::default();
//!     config.database = "metrics".to_string();
//!
//!     let client = Client::connect(&config).await?;
//!
//!     let stmt = client
//!         .select(vec![DataSource::measurement("cpu")])?
//!         .with_columns("time,value")
//!         .with_limit(10);
//!
//!     let table = client.execute(&stmt).await?;
//!     println!("{} rows from {}", table.values.len(), table.name);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod quote;
pub mod statement;
pub mod table;

// Re-export top-level types for convenience
pub use client::Client;
pub use config::{Config, ConfigError, ConnectionConfig, LoggingConfig};
pub use error::{ClientError, ClientResult};
pub use quote::quote;
pub use statement::{DataSource, RetentionPolicy, Statement};
pub use table::{QueryResponse, Series, SeriesResult, Table, Value};
