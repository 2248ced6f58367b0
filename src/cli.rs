//! Command-line argument parsing for quarry.

use clap::Parser;
use std::path::PathBuf;

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned plain-text table.
    #[default]
    Text,
    /// JSON object with columns, rows, and row count.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Run SQL against the analytics query engine.
///
/// Statements run in order over one connection; the last statement's
/// result is printed.
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQL statement(s) to execute, in order
    #[arg(value_name = "SQL", required = true)]
    pub statements: Vec<String>,

    /// Backend catalog to query
    #[arg(short = 'C', long, value_name = "CATALOG")]
    pub catalog: Option<String>,

    /// Engine coordinator host
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Engine coordinator port
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Engine user (defaults to $USER)
    #[arg(short = 'U', long, value_name = "USER")]
    pub user: Option<String>,

    /// Client source tag for the engine's audit log
    #[arg(long, value_name = "SOURCE")]
    pub source: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(short = 'f', long, value_name = "FORMAT", default_value = "text")]
    pub format: String,
}

impl Cli {
    /// Parses CLI arguments from the process environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses the output format argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.format.parse()
    }

    /// Returns the config file path (explicit or platform default).
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::EngineConfig::default_path)
    }
}
