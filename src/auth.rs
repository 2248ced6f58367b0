//! Kerberos ticket precondition check.
//!
//! The engine authenticates callers with Kerberos, so a valid ticket must
//! exist before any connection attempt. The check is a trait so tests can
//! substitute a canned answer.

use crate::error::{QuarryError, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Verifies that the caller already holds a valid ticket-based credential.
///
/// Called by the runner before connecting; a failure aborts the whole call
/// with no connection attempted.
pub trait TicketCheck: Send + Sync {
    /// Returns `Ok(())` if a valid ticket is present, an authentication
    /// error otherwise.
    fn check(&self) -> Result<()>;
}

/// Production check: probes the credential cache with `klist -s`.
///
/// `klist -s` exits zero when the cache holds a non-expired TGT and prints
/// nothing, which is all we need here. The probe runs against the
/// configured Kerberos configuration file.
#[derive(Debug)]
pub struct KlistTicketCheck {
    config_path: PathBuf,
}

impl KlistTicketCheck {
    /// Creates a check probing against the given krb5 configuration file.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }
}

impl TicketCheck for KlistTicketCheck {
    fn check(&self) -> Result<()> {
        let status = Command::new("klist")
            .env("KRB5_CONFIG", &self.config_path)
            .arg("-s")
            .status()
            .map_err(|e| {
                QuarryError::authentication(format!("Could not run klist to verify ticket: {e}"))
            })?;

        if status.success() {
            debug!("Kerberos ticket cache is valid");
            Ok(())
        } else {
            Err(QuarryError::authentication(
                "No valid Kerberos ticket found. Run `kinit` and try again.",
            ))
        }
    }
}

/// Test check with a fixed answer.
#[derive(Debug)]
pub struct StaticTicketCheck {
    valid: bool,
}

impl StaticTicketCheck {
    /// A check that always passes.
    pub fn valid() -> Self {
        Self { valid: true }
    }

    /// A check that always fails.
    pub fn invalid() -> Self {
        Self { valid: false }
    }
}

impl TicketCheck for StaticTicketCheck {
    fn check(&self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(QuarryError::authentication("ticket expired"))
        }
    }
}
