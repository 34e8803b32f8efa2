//! Custom error types for the bridge.
//!
//! This module defines the primary error type, `BridgeError`, for the entire
//! library. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different kinds of failure a vendor-driven
//! bridge can hit, from local argument validation to exhausted fallback
//! chains.
//!
//! ## Error Hierarchy
//!
//! `BridgeError` consolidates the error sources:
//!
//! - **`InvalidArgument`**: a caller-supplied argument failed local validation
//!   before any vendor call was attempted (unrecognized scale-type string,
//!   negative minor tick count, non-finite range bound). Raised fail-fast so
//!   no partial vendor mutation can occur.
//! - **`CapabilityUnavailable`**: every registered strategy for an operation
//!   failed. The aggregate preserves each attempted strategy and its
//!   individual failure reason, which is the primary diagnostic for
//!   vendor-version mismatches.
//! - **`ProjectNotFound` / `ProjectDirNotFound` / `ProjectLoad`**: the
//!   project path handed to [`crate::Session::open`] does not resolve to a
//!   loadable project.
//! - **`SessionConflict` / `TooManySessions`**: the process-global session
//!   registry rejected a second session on the same path or one over the
//!   configured limit.
//! - **`NameConflict`**: page creation was asked to reuse an existing name.
//! - **`Vendor`**: a single vendor call outside the fallback adapter failed.
//! - **`Config` / `Configuration`**: configuration parse errors (wrapped
//!   `figment` errors) versus semantic errors caught during validation.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::capability::AxisKind;

/// Convenience alias for results using the bridge error type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Primary error type for the bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Caller argument rejected by local validation, before any vendor call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Every fallback strategy for an operation failed.
    #[error(transparent)]
    CapabilityUnavailable(#[from] CapabilityUnavailable),

    /// The directory that should contain the project does not exist.
    #[error("Project directory not found: {}", .0.display())]
    ProjectDirNotFound(PathBuf),

    /// The project file does not exist and creating it was not allowed.
    #[error("Project file not found: {}", .0.display())]
    ProjectNotFound(PathBuf),

    /// The vendor application failed to load or create the project.
    #[error("Failed to load project {}: {reason}", .path.display())]
    ProjectLoad {
        /// Path of the project that failed to load.
        path: PathBuf,
        /// Vendor-reported reason.
        reason: String,
    },

    /// A session for this project path is already active in this process.
    #[error("A session is already open for {}", .0.display())]
    SessionConflict(PathBuf),

    /// The configured concurrent-session limit was reached.
    #[error("Too many concurrent sessions (limit {0})")]
    TooManySessions(usize),

    /// A page with this name already exists in the target folder.
    #[error("A page named '{0}' already exists")]
    NameConflict(String),

    /// A vendor call outside the fallback adapter failed.
    #[error("Vendor call failed: {0}")]
    Vendor(String),

    /// Configuration parse error.
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Semantic configuration error caught during validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),
}

impl BridgeError {
    /// Wraps a vendor-seam failure, preserving the full error chain text.
    pub(crate) fn vendor(err: anyhow::Error) -> Self {
        BridgeError::Vendor(format!("{err:#}"))
    }
}

/// One failed attempt inside a fallback chain.
///
/// Internal to a resolution; only ever surfaced as part of a
/// [`CapabilityUnavailable`] aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    /// Human-readable description of the attempted strategy.
    pub strategy: String,
    /// The failure reason reported by the vendor seam.
    pub reason: String,
}

/// Aggregate failure raised after every strategy for an operation failed.
///
/// Carries the operation name, the target axis kind, and one
/// [`StrategyFailure`] per attempted strategy, in attempt order. The message
/// enumerates all of them so a vendor-version mismatch can be diagnosed from
/// the error alone.
#[derive(Debug)]
pub struct CapabilityUnavailable {
    /// Logical operation name, e.g. `set_scale`.
    pub operation: &'static str,
    /// Axis the operation targeted.
    pub target: AxisKind,
    /// Every attempted strategy with its failure reason, in attempt order.
    pub attempts: Vec<StrategyFailure>,
}

impl fmt::Display for CapabilityUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Operation '{}' unavailable on {} axis after {} strategies",
            self.operation,
            self.target,
            self.attempts.len()
        )?;
        for (index, attempt) in self.attempts.iter().enumerate() {
            write!(
                f,
                "; [{}] {}: {}",
                index + 1,
                attempt.strategy,
                attempt.reason
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for CapabilityUnavailable {}
