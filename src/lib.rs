//! quarry - run SQL against a Presto/Trino engine and get a typed table
//! back.
//!
//! The crate executes one or more SQL statements sequentially over a single
//! engine connection and materializes the final statement's result as a
//! [`table::TypedTable`], with temporal columns already parsed into chrono
//! values. A non-row-returning statement (DDL/DML) yields `None`.
//!
//! ```no_run
//! # async fn demo() -> quarry::error::Result<()> {
//! let table = quarry::runner::run("SELECT 1 AS x", None).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod runner;
pub mod table;

pub use error::{QuarryError, Result};
pub use runner::{run, Commands, Runner};
pub use table::{CellValue, ColumnInfo, TypedTable};
