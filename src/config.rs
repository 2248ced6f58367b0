//! Engine connection configuration for quarry.
//!
//! Handles loading configuration from TOML files and environment variables.
//! The runner receives an `EngineConfig` as an injected object; nothing in
//! the crate reads global state directly at query time.

use crate::error::{QuarryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use url::Url;

/// Connection parameters for the SQL engine endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine coordinator host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Engine coordinator port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Transport scheme. The engine endpoint is TLS-only in practice.
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Catalog used when the caller does not name one.
    #[serde(default = "default_catalog")]
    pub default_catalog: String,

    /// User identity sent to the engine. Defaults to the OS user.
    pub user: Option<String>,

    /// Free-text client tag for the engine's audit/monitoring.
    pub source: Option<String>,

    /// Kerberos authentication parameters.
    #[serde(default)]
    pub kerberos: KerberosConfig,
}

/// Kerberos parameters for the engine connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KerberosConfig {
    /// Path to the Kerberos configuration file, used when probing the
    /// ticket cache.
    #[serde(default = "default_krb5_config")]
    pub config_path: PathBuf,

    /// Realm suffix appended to the OS user to form the principal.
    #[serde(default = "default_realm")]
    pub realm: String,

    /// CA bundle trusted for the TLS session.
    #[serde(default = "default_ca_bundle")]
    pub ca_bundle: PathBuf,
}

fn default_host() -> String {
    "an-coord1001.eqiad.wmnet".to_string()
}

fn default_port() -> u16 {
    8281
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_catalog() -> String {
    "analytics_hive".to_string()
}

fn default_krb5_config() -> PathBuf {
    PathBuf::from("/etc/krb5.conf")
}

fn default_realm() -> String {
    "WIKIMEDIA".to_string()
}

fn default_ca_bundle() -> PathBuf {
    PathBuf::from("/etc/ssl/certs/Puppet_Internal_CA.pem")
}

impl Default for KerberosConfig {
    fn default() -> Self {
        Self {
            config_path: default_krb5_config(),
            realm: default_realm(),
            ca_bundle: default_ca_bundle(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            scheme: default_scheme(),
            default_catalog: default_catalog(),
            user: None,
            source: None,
            kerberos: KerberosConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quarry")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the built-in defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| QuarryError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            QuarryError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies environment variables as defaults for unset fields.
    pub fn apply_env_defaults(&mut self) {
        if self.user.is_none() {
            self.user = std::env::var("USER").ok();
        }
        if let Ok(host) = std::env::var("QUARRY_HOST") {
            self.host = host;
        }
        if let Ok(port_str) = std::env::var("QUARRY_PORT") {
            if let Ok(port) = port_str.parse() {
                self.port = port;
            }
        }
        if let Ok(catalog) = std::env::var("QUARRY_CATALOG") {
            self.default_catalog = catalog;
        }
    }

    /// Returns the resolved engine user.
    pub fn resolved_user(&self) -> Result<String> {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .ok_or_else(|| QuarryError::config("No engine user configured and $USER is unset"))
    }

    /// Returns the Kerberos principal for the resolved user.
    pub fn principal(&self) -> Result<String> {
        Ok(format!("{}@{}", self.resolved_user()?, self.kerberos.realm))
    }

    /// Returns the source tag sent to the engine for audit purposes.
    pub fn source_tag(&self) -> Result<String> {
        match &self.source {
            Some(source) => Ok(source.clone()),
            None => Ok(format!("{}, quarry", self.resolved_user()?)),
        }
    }

    /// Returns the statement endpoint URL.
    pub fn statement_url(&self) -> Result<Url> {
        let raw = format!("{}://{}:{}/v1/statement", self.scheme, self.host, self.port);
        Url::parse(&raw).map_err(|e| QuarryError::config(format!("Invalid engine endpoint: {e}")))
    }

    /// Returns a display-safe string for logging.
    pub fn display_string(&self) -> String {
        format!(
            "{} @ {}://{}:{}",
            self.default_catalog, self.scheme, self.host, self.port
        )
    }
}
