//! HTTP implementation of the engine's statement protocol.
//!
//! The engine (Presto/Trino) exposes queries over HTTPS: POST the SQL text
//! to `/v1/statement`, then follow the returned `nextUri` pages until the
//! result is complete, accumulating the column list and data rows along
//! the way. Cancellation is a DELETE on the last `nextUri`.

use crate::client::{EngineClient, StatementOutput};
use crate::config::EngineConfig;
use crate::error::{QuarryError, Result};
use crate::table::{ColumnInfo, RawValue};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Delay between polls while the statement is still queued.
const POLL_DELAY_MS: u64 = 100;

/// Schema sent with every statement; the engine resolves unqualified
/// table names against it.
const DEFAULT_SCHEMA: &str = "default";

/// One response page of the statement protocol.
#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    columns: Option<Vec<WireColumn>>,
    #[serde(default)]
    data: Option<Vec<Vec<RawValue>>>,
    #[serde(rename = "nextUri", default)]
    next_uri: Option<String>,
    #[serde(default)]
    error: Option<WireError>,
}

/// Column descriptor as the engine reports it.
#[derive(Debug, Deserialize)]
struct WireColumn {
    name: String,
    #[serde(rename = "type")]
    type_tag: String,
}

/// Failure payload attached to a statement page.
#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    message: String,
    #[serde(rename = "errorName", default)]
    error_name: Option<String>,
}

impl WireError {
    fn describe(&self) -> String {
        match &self.error_name {
            Some(name) => format!("{}: {}", name, self.message),
            None => self.message.clone(),
        }
    }
}

/// HTTP engine client holding one logical connection for one invocation.
pub struct HttpEngineClient {
    http: Client,
    statement_url: Url,
    /// Kerberos principal sent as the engine user identity.
    user: String,
    catalog: String,
    schema: String,
    source: String,
    /// `nextUri` of an in-flight statement, kept for best-effort cancel.
    in_flight: Option<String>,
}

impl HttpEngineClient {
    /// Builds a client for the given configuration and catalog.
    ///
    /// The configured CA bundle is added to the trust store when readable;
    /// identity headers are derived from the resolved user.
    pub fn new(config: &EngineConfig, catalog: &str) -> Result<Self> {
        // No overall timeout: the runner defers timeout behavior to the
        // transport defaults.
        let mut builder = Client::builder();

        match std::fs::read(&config.kerberos.ca_bundle) {
            Ok(pem) => {
                let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    QuarryError::config(format!(
                        "Invalid CA bundle {}: {e}",
                        config.kerberos.ca_bundle.display()
                    ))
                })?;
                builder = builder.add_root_certificate(cert);
            }
            Err(e) => {
                warn!(
                    "CA bundle {} not readable ({e}); relying on system trust store",
                    config.kerberos.ca_bundle.display()
                );
            }
        }

        let http = builder
            .build()
            .map_err(|e| QuarryError::connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            statement_url: config.statement_url()?,
            user: config.principal()?,
            catalog: catalog.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            source: config.source_tag()?,
            in_flight: None,
        })
    }

    /// Issues the initial POST for a statement.
    async fn submit(&self, sql: &str) -> Result<StatementResponse> {
        let response = self
            .http
            .post(self.statement_url.clone())
            .header("X-Trino-User", &self.user)
            .header("X-Presto-User", &self.user)
            .header("X-Trino-Catalog", &self.catalog)
            .header("X-Presto-Catalog", &self.catalog)
            .header("X-Trino-Schema", &self.schema)
            .header("X-Presto-Schema", &self.schema)
            .header("X-Trino-Source", &self.source)
            .header("X-Presto-Source", &self.source)
            .body(sql.to_string())
            .send()
            .await
            .map_err(|e| QuarryError::connection(format!("Failed to reach engine: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuarryError::connection(format!(
                "Engine returned HTTP {status} for statement submission"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| QuarryError::connection(format!("Malformed engine response: {e}")))
    }

    /// Fetches the next page of an in-flight statement.
    async fn fetch_page(&self, uri: &str) -> Result<StatementResponse> {
        let response = self
            .http
            .get(uri)
            .header("X-Trino-User", &self.user)
            .header("X-Presto-User", &self.user)
            .send()
            .await
            .map_err(|e| QuarryError::connection(format!("Lost engine session: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuarryError::connection(format!(
                "Engine returned HTTP {status} while fetching results"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| QuarryError::connection(format!("Malformed engine response: {e}")))
    }

    /// DELETEs the last known `nextUri`. Failures are logged, not raised.
    async fn cancel_in_flight(&mut self) {
        if let Some(uri) = self.in_flight.take() {
            match self.http.delete(uri.as_str()).send().await {
                Ok(_) => debug!("Cancelled in-flight statement"),
                Err(e) => debug!("Best-effort cancel failed: {e}"),
            }
        }
    }
}

#[async_trait]
impl EngineClient for HttpEngineClient {
    async fn execute(&mut self, sql: &str) -> Result<StatementOutput> {
        let mut page = self.submit(sql).await?;
        if let Some(id) = &page.id {
            debug!("Statement accepted as query {id}");
        }

        let mut columns: Vec<ColumnInfo> = Vec::new();
        let mut rows: Vec<Vec<RawValue>> = Vec::new();

        loop {
            if let Some(error) = &page.error {
                self.in_flight = None;
                return Err(QuarryError::execution(0, sql, error.describe()));
            }

            if columns.is_empty() {
                if let Some(wire_columns) = &page.columns {
                    columns = wire_columns
                        .iter()
                        .map(|c| ColumnInfo::new(&c.name, &c.type_tag))
                        .collect();
                }
            }

            let mut got_data = false;
            if let Some(data) = page.data.take() {
                got_data = !data.is_empty();
                rows.extend(data);
            }

            match page.next_uri.take() {
                Some(uri) => {
                    self.in_flight = Some(uri.clone());
                    if !got_data && columns.is_empty() {
                        // Still queued; give the coordinator a moment.
                        tokio::time::sleep(Duration::from_millis(POLL_DELAY_MS)).await;
                    }
                    page = match self.fetch_page(&uri).await {
                        Ok(next) => next,
                        Err(e) => {
                            self.cancel_in_flight().await;
                            return Err(e);
                        }
                    };
                }
                None => break,
            }
        }

        self.in_flight = None;
        Ok(StatementOutput::new(columns, rows))
    }

    async fn close(&mut self) -> Result<()> {
        self.cancel_in_flight().await;
        Ok(())
    }
}
