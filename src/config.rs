//! Environment-driven configuration.
//!
//! Each loader has a `from_env` form and a `from_lookup` form taking a
//! variable lookup closure, so tests never touch the process environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::audit::JsonLinesAuditSink;
use crate::error::{AuditSinkError, ConfigError};
use crate::Secret;

/// Default Vault address when `VAULT_URL` is unset.
pub const DEFAULT_VAULT_URL: &str = "http://localhost:8200";

/// Default KV v2 mount when `VAULT_MOUNT` is unset.
pub const DEFAULT_VAULT_MOUNT: &str = "secret";

/// Default request timeout when `VAULT_TIMEOUT_SECS` is unset.
pub const DEFAULT_VAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default audit log file when `SECRET_AUDIT_LOG` is unset.
pub const DEFAULT_AUDIT_LOG: &str = "/var/log/secret_access.log";

/// Connection settings for a Vault KV v2 backend.
#[derive(Debug)]
pub struct VaultConfig {
    /// Base URL of the Vault server.
    pub address: String,
    /// Client token; redacted in `Debug`.
    pub token: Secret<String>,
    /// Mount point of the KV v2 engine.
    pub mount: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl VaultConfig {
    /// Loads from `VAULT_URL`, `VAULT_TOKEN`, `VAULT_MOUNT` and `VAULT_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingVar`] if `VAULT_TOKEN` is unset or empty;
    /// [`ConfigError::InvalidValue`] if the timeout is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads using `lookup` to resolve variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("VAULT_TOKEN")
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingVar { name: "VAULT_TOKEN" })?;

        let timeout = match lookup("VAULT_TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_VAULT_TIMEOUT,
        };

        Ok(Self {
            address: lookup("VAULT_URL").unwrap_or_else(|| DEFAULT_VAULT_URL.to_string()),
            token: Secret::new(token),
            mount: lookup("VAULT_MOUNT").unwrap_or_else(|| DEFAULT_VAULT_MOUNT.to_string()),
            timeout,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        Ok(_) => Err(ConfigError::InvalidValue {
            name: "VAULT_TIMEOUT_SECS",
            reason: "must be greater than zero".to_string(),
        }),
        Err(err) => Err(ConfigError::InvalidValue {
            name: "VAULT_TIMEOUT_SECS",
            reason: err.to_string(),
        }),
    }
}

/// Where audit records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Append-only JSON-lines file.
    pub log_file: PathBuf,
}

impl AuditConfig {
    /// Loads from `SECRET_AUDIT_LOG`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads using `lookup` to resolve variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            log_file: lookup("SECRET_AUDIT_LOG")
                .filter(|path| !path.is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_AUDIT_LOG), PathBuf::from),
        }
    }

    /// Opens the configured file as an audit sink.
    pub fn open_sink(&self) -> Result<JsonLinesAuditSink, AuditSinkError> {
        JsonLinesAuditSink::open(&self.log_file)
    }
}

/// Output format for operational logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Loads from `LOG_FORMAT` (`text` or `json`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads using `lookup` to resolve variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") => Ok(Self::Text),
            Some(value) if value.eq_ignore_ascii_case("text") => Ok(Self::Text),
            Some(value) if value.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(other) => Err(ConfigError::InvalidValue {
                name: "LOG_FORMAT",
                reason: format!("expected `text` or `json`, got `{other}`"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn vault_defaults() {
        let config = VaultConfig::from_lookup(env(&[("VAULT_TOKEN", "hvs.test")])).unwrap();

        assert_eq!(config.address, DEFAULT_VAULT_URL);
        assert_eq!(config.mount, "secret");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.token.expose_secret(), "hvs.test");
    }

    #[test]
    fn vault_overrides() {
        let config = VaultConfig::from_lookup(env(&[
            ("VAULT_TOKEN", "t"),
            ("VAULT_URL", "https://vault.internal:8200"),
            ("VAULT_MOUNT", "kv"),
            ("VAULT_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.address, "https://vault.internal:8200");
        assert_eq!(config.mount, "kv");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn vault_token_is_required() {
        assert_eq!(
            VaultConfig::from_lookup(env(&[])).unwrap_err(),
            ConfigError::MissingVar { name: "VAULT_TOKEN" }
        );
        assert!(VaultConfig::from_lookup(env(&[("VAULT_TOKEN", "")])).is_err());
    }

    #[test]
    fn vault_timeout_is_validated() {
        for bad in ["0", "soon", "-1"] {
            let err = VaultConfig::from_lookup(env(&[
                ("VAULT_TOKEN", "t"),
                ("VAULT_TIMEOUT_SECS", bad),
            ]))
            .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue { name: "VAULT_TIMEOUT_SECS", .. }
            ));
        }
    }

    #[test]
    fn vault_config_debug_redacts_token() {
        let config = VaultConfig::from_lookup(env(&[("VAULT_TOKEN", "hvs.supersecret")])).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("supersecret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn audit_log_path() {
        assert_eq!(
            AuditConfig::from_lookup(env(&[])).log_file,
            PathBuf::from(DEFAULT_AUDIT_LOG)
        );
        assert_eq!(
            AuditConfig::from_lookup(env(&[("SECRET_AUDIT_LOG", "/tmp/audit.log")])).log_file,
            PathBuf::from("/tmp/audit.log")
        );
    }

    #[test]
    fn audit_config_opens_sink() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuditConfig {
            log_file: dir.path().join("audit.log"),
        };
        assert!(config.open_sink().is_ok());
        assert!(config.log_file.exists());
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::from_lookup(env(&[])).unwrap(), LogFormat::Text);
        assert_eq!(
            LogFormat::from_lookup(env(&[("LOG_FORMAT", "JSON")])).unwrap(),
            LogFormat::Json
        );
        assert!(LogFormat::from_lookup(env(&[("LOG_FORMAT", "yaml")])).is_err());
    }
}
