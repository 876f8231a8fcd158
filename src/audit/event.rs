//! Audit record schema.
//!
//! This module defines the structure of the records written for every secret
//! access attempt. No field can hold a secret value.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// The secret operation being audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretAction {
    /// A secret was read.
    Read,
    /// A secret was created or updated.
    Write,
    /// A secret and all its versions were deleted.
    Delete,
}

impl fmt::Display for SecretAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretAction::Read => write!(f, "read"),
            SecretAction::Write => write!(f, "write"),
            SecretAction::Delete => write!(f, "delete"),
        }
    }
}

/// Outcome of an audited attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// The backend call completed.
    Success,
    /// The call failed or was never made because the backend is unavailable.
    Failure,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Success => write!(f, "success"),
            AuditOutcome::Failure => write!(f, "failure"),
        }
    }
}

/// One immutable audit entry for a secret access attempt.
///
/// Records are created only by the store's audit clock, which assigns a
/// gap-free `sequence` and a non-decreasing `timestamp`.
///
/// # Safety Invariants
///
/// - No secret value is stored, including on writes
/// - Only identifiers and metadata
///
/// # Example
///
/// ```
/// use access_guard::audit::{AuditRecord, AuditOutcome, SecretAction};
///
/// let line = r#"{"sequence":7,"timestamp":"2026-01-01T00:00:00Z","actor":"admin","secret_path":"myapp/api","action":"write","outcome":"failure"}"#;
/// let record: AuditRecord = serde_json::from_str(line).unwrap();
///
/// assert_eq!(record.action(), SecretAction::Write);
/// assert_eq!(record.outcome(), AuditOutcome::Failure);
/// assert!(record.origin().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    sequence: u64,
    timestamp: DateTime<Utc>,
    actor: String,
    secret_path: String,
    action: SecretAction,
    outcome: AuditOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    origin: Option<IpAddr>,
}

impl AuditRecord {
    pub(crate) fn new(
        sequence: u64,
        timestamp: DateTime<Utc>,
        actor: &str,
        secret_path: &str,
        action: SecretAction,
        outcome: AuditOutcome,
        origin: Option<IpAddr>,
    ) -> Self {
        Self {
            sequence,
            timestamp,
            actor: actor.to_string(),
            secret_path: secret_path.to_string(),
            action,
            outcome,
            origin,
        }
    }

    /// Position of this record in the store's audit stream, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// UTC time the record was issued.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Identity that attempted the access.
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Secret path the attempt targeted.
    pub fn secret_path(&self) -> &str {
        &self.secret_path
    }

    /// Operation attempted.
    pub fn action(&self) -> SecretAction {
        self.action
    }

    /// Whether the attempt succeeded.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Network origin of the caller, if known.
    pub fn origin(&self) -> Option<IpAddr> {
        self.origin
    }

    /// Encodes the record as a single-line JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Renders the record as space-separated `field=value` pairs.
impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sequence={} timestamp={} actor={:?} path={:?} action={} outcome={}",
            self.sequence,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.actor,
            self.secret_path,
            self.action,
            self.outcome,
        )?;
        if let Some(origin) = self.origin {
            write!(f, " origin={}", origin)?;
        }
        Ok(())
    }
}
