//! Statement executors for SchemaFerry
//!
//! An executor takes one DDL string and applies it to the warehouse. The
//! ingestion loop only sees the [`StatementExecutor`] trait, so the Hive
//! clients here can be swapped for any other backend.
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemaferry_executor::{HiveCliExecutor, StatementExecutor};
//!
//! let executor = HiveCliExecutor::new("/usr/local/hive/bin/hive");
//! executor.test_connection().await?;
//! executor.execute("CREATE DATABASE IF NOT EXISTS sales;").await?;
//! ```

pub mod executor;
pub mod process;
pub mod hive;
pub mod beeline;
pub mod dry_run;
pub mod mock;

pub use executor::{StatementExecutor, ExecutionError, from_config};
pub use process::EngineProcess;
pub use hive::HiveCliExecutor;
pub use beeline::BeelineExecutor;
pub use dry_run::DryRunExecutor;
pub use mock::MockExecutor;
