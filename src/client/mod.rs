//! Engine client abstraction.
//!
//! Provides a trait-based seam between the runner and the engine's wire
//! protocol, so tests can substitute scripted clients.

mod http;
mod mock;

pub use http::HttpEngineClient;
pub use mock::{ack_output, MockEngineClient, MockHandle};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::table::{self, ColumnInfo, RawValue};
use async_trait::async_trait;

/// Raw output of one executed statement: driver-reported columns plus rows
/// in their driver-native representation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementOutput {
    /// Column descriptors, in result order.
    pub columns: Vec<ColumnInfo>,

    /// Rows, positionally aligned with `columns`.
    pub rows: Vec<Vec<RawValue>>,
}

impl StatementOutput {
    /// Creates an output from columns and rows.
    pub fn new(columns: Vec<ColumnInfo>, rows: Vec<Vec<RawValue>>) -> Self {
        Self { columns, rows }
    }

    /// Returns true if this output is the driver's non-row-returning
    /// acknowledgment rather than a genuine result set.
    pub fn is_ack(&self) -> bool {
        table::is_ack(&self.columns, &self.rows)
    }
}

/// One logical connection to the engine, scoped to a single catalog.
///
/// A client is owned by exactly one runner invocation; it is never shared,
/// pooled, or reused. Statements run one at a time with no overlap.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Executes one statement to completion and returns its full output.
    async fn execute(&mut self, sql: &str) -> Result<StatementOutput>;

    /// Releases the connection, cancelling any in-flight statement
    /// best-effort first.
    async fn close(&mut self) -> Result<()>;
}

/// Creates an engine client for the given configuration and catalog.
pub fn connect(config: &EngineConfig, catalog: &str) -> Result<Box<dyn EngineClient>> {
    let client = HttpEngineClient::new(config, catalog)?;
    Ok(Box::new(client))
}
