//! The query runner.
//!
//! Executes one or more SQL statements in order over a single engine
//! connection and materializes the last statement's result as a
//! [`TypedTable`]. A statement that produces no result set (the driver's
//! acknowledgment shape) yields `None` instead of a table.

use crate::auth::{KlistTicketCheck, TicketCheck};
use crate::client::{self, EngineClient};
use crate::config::EngineConfig;
use crate::error::{QuarryError, Result};
use crate::table::TypedTable;
use tracing::{debug, warn};

/// An ordered, non-empty sequence of SQL statements.
///
/// Normalizes the two accepted call shapes: a lone statement string or a
/// list of statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commands(Vec<String>);

impl Commands {
    /// Returns true if no statements were provided.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the statements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl From<&str> for Commands {
    fn from(sql: &str) -> Self {
        Self(vec![sql.to_string()])
    }
}

impl From<String> for Commands {
    fn from(sql: String) -> Self {
        Self(vec![sql])
    }
}

impl From<Vec<String>> for Commands {
    fn from(sqls: Vec<String>) -> Self {
        Self(sqls)
    }
}

impl From<Vec<&str>> for Commands {
    fn from(sqls: Vec<&str>) -> Self {
        Self(sqls.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for Commands {
    fn from(sqls: &[&str]) -> Self {
        Self(sqls.iter().map(|s| s.to_string()).collect())
    }
}

/// Runs SQL statement sequences against the engine.
///
/// Holds the injected connection parameters and the ticket precondition
/// check; each `run` call owns its connection exclusively for the duration
/// of the call.
pub struct Runner {
    config: EngineConfig,
    ticket: Box<dyn TicketCheck>,
}

impl Runner {
    /// Creates a runner with the production ticket check.
    pub fn new(config: EngineConfig) -> Self {
        let ticket = Box::new(KlistTicketCheck::new(config.kerberos.config_path.clone()));
        Self { config, ticket }
    }

    /// Replaces the ticket precondition check.
    pub fn with_ticket_check(mut self, ticket: Box<dyn TicketCheck>) -> Self {
        self.ticket = ticket;
        self
    }

    /// Executes `commands` in order against `catalog` (the configured
    /// default when `None`) and returns the last statement's typed table,
    /// or `None` if the last statement produced no result set.
    ///
    /// The first failing statement aborts the sequence; earlier results
    /// are discarded and the connection is released on every exit path.
    pub async fn run(
        &self,
        commands: impl Into<Commands>,
        catalog: Option<&str>,
    ) -> Result<Option<TypedTable>> {
        let commands = commands.into();
        let catalog = catalog.unwrap_or(&self.config.default_catalog);

        self.preflight(&commands)?;

        debug!(
            "Running {} statement(s) against catalog '{catalog}'",
            commands.len()
        );
        let client = client::connect(&self.config, catalog)?;
        Self::drive(&commands, client).await
    }

    /// Like [`Runner::run`], but against a caller-supplied client.
    ///
    /// This is the seam integration tests use; the precondition check and
    /// sequencing semantics are identical.
    pub async fn run_with_client(
        &self,
        commands: impl Into<Commands>,
        client: Box<dyn EngineClient>,
    ) -> Result<Option<TypedTable>> {
        let commands = commands.into();
        self.preflight(&commands)?;
        Self::drive(&commands, client).await
    }

    /// Validates the command list and the authentication precondition,
    /// in that order, before any connection exists.
    fn preflight(&self, commands: &Commands) -> Result<()> {
        if commands.is_empty() {
            return Err(QuarryError::internal("no SQL statements provided"));
        }
        self.ticket.check()
    }

    /// Runs the sequence and guarantees the client is released on every
    /// exit path, success or failure.
    async fn drive(
        commands: &Commands,
        mut client: Box<dyn EngineClient>,
    ) -> Result<Option<TypedTable>> {
        let outcome = Self::execute_all(commands, client.as_mut()).await;

        match outcome {
            Ok(result) => {
                client.close().await?;
                Ok(result)
            }
            Err(e) => {
                // The original error wins; a close failure here is only
                // worth a log line.
                if let Err(close_err) = client.close().await {
                    warn!("Failed to release engine connection: {close_err}");
                }
                Err(e)
            }
        }
    }

    /// Executes every statement in order over one client, keeping only the
    /// last statement's outcome.
    async fn execute_all(
        commands: &Commands,
        client: &mut dyn EngineClient,
    ) -> Result<Option<TypedTable>> {
        let mut last: Option<TypedTable> = None;

        for (index, sql) in commands.iter().enumerate() {
            let output = client
                .execute(sql)
                .await
                .map_err(|e| tag_execution(e, index, sql))?;

            if output.is_ack() {
                debug!("Statement {index} produced no result set");
                last = None;
            } else {
                last = Some(TypedTable::from_raw(output.columns, output.rows)?);
            }
        }

        Ok(last)
    }
}

/// Stamps an execution failure with the position and text of the statement
/// that caused it. Other error kinds pass through untouched.
fn tag_execution(error: QuarryError, index: usize, sql: &str) -> QuarryError {
    match error {
        QuarryError::Execution { message, .. } => QuarryError::execution(index, sql, message),
        other => other,
    }
}

/// Runs SQL against the engine using the default configuration.
///
/// Loads `EngineConfig` from the default config path, applies environment
/// defaults, verifies the Kerberos ticket, and executes `commands` against
/// `catalog` (the configured default catalog when `None`).
pub async fn run(
    commands: impl Into<Commands>,
    catalog: Option<&str>,
) -> Result<Option<TypedTable>> {
    let mut config = EngineConfig::load_from_file(&EngineConfig::default_path())?;
    config.apply_env_defaults();
    Runner::new(config).run(commands, catalog).await
}
