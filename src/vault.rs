//! HashiCorp Vault KV v2 adapter.
//!
//! Enabled with the `vault` cargo feature. Requests are blocking and carry
//! the client token in the `X-Vault-Token` header.
//!
//! | Primitive      | Request                                    |
//! |----------------|--------------------------------------------|
//! | authenticate   | `GET  /v1/auth/token/lookup-self`          |
//! | read_secret    | `GET  /v1/{mount}/data/{path}`             |
//! | write_secret   | `POST /v1/{mount}/data/{path}`             |
//! | delete_secret  | `DELETE /v1/{mount}/metadata/{path}`       |
//!
//! Secret paths are appended segment by segment, so reserved URL characters
//! are percent-encoded. Paths with empty, `.` or `..` segments are refused
//! with [`BackendFault::InvalidPath`] before any request is sent.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::backend::SecretBackend;
use crate::config::VaultConfig;
use crate::error::BackendFault;
use crate::{Secret, SecretData};

/// [`SecretBackend`] over a Vault KV v2 secrets engine.
///
/// ```no_run
/// use access_guard::{AuditedSecretStore, VaultConfig, VaultKvBackend};
/// use access_guard::audit::TracingAuditSink;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = VaultKvBackend::new(VaultConfig::from_env()?)?;
/// let store = AuditedSecretStore::connect(backend, TracingAuditSink::new());
/// # let _ = store;
/// # Ok(()) }
/// ```
pub struct VaultKvBackend {
    client: Client,
    address: Url,
    mount: String,
    token: Secret<String>,
}

#[derive(Deserialize)]
struct ReadResponse {
    data: ReadEnvelope,
}

#[derive(Deserialize)]
struct ReadEnvelope {
    data: Option<Map<String, Value>>,
}

impl VaultKvBackend {
    /// Builds the HTTP client. No request is sent until `authenticate`.
    ///
    /// # Errors
    ///
    /// [`BackendFault::Transport`] if the address is not an absolute HTTP(S)
    /// URL or the HTTP client cannot be built.
    pub fn new(config: VaultConfig) -> Result<Self, BackendFault> {
        let address = Url::parse(&config.address)
            .map_err(|err| BackendFault::transport(format!("invalid vault address: {err}")))?;
        if address.cannot_be_a_base() {
            return Err(BackendFault::transport("invalid vault address: not a base URL"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| BackendFault::transport(err.to_string()))?;

        Ok(Self {
            client,
            address,
            mount: config.mount.trim_matches('/').to_string(),
            token: config.token,
        })
    }

    /// `/v1/{mount}/{section}/{path}`, one URL segment per path segment.
    fn endpoint(&self, section: &str, path: &str) -> Result<Url, BackendFault> {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        if segments
            .iter()
            .any(|segment| matches!(*segment, "" | "." | ".."))
        {
            return Err(BackendFault::InvalidPath);
        }

        let mount = self.mount.split('/').filter(|segment| !segment.is_empty());
        self.url(
            std::iter::once("v1")
                .chain(mount)
                .chain(std::iter::once(section))
                .chain(segments),
        )
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, BackendFault> {
        let mut url = self.address.clone();
        url.path_segments_mut()
            .map_err(|()| BackendFault::transport("invalid vault address: not a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, BackendFault> {
        let response = request
            .header("X-Vault-Token", self.token.expose_secret())
            .send()
            .map_err(fault_from_transport)?;
        check_status(response.status())?;
        Ok(response)
    }
}

impl SecretBackend for VaultKvBackend {
    fn authenticate(&self) -> Result<(), BackendFault> {
        let url = self.url(["v1", "auth", "token", "lookup-self"])?;
        self.send(self.client.get(url)).map(|_| ())
    }

    fn read_secret(&self, path: &str) -> Result<SecretData, BackendFault> {
        let response = self.send(self.client.get(self.endpoint("data", path)?))?;
        let body: ReadResponse = response.json().map_err(fault_from_transport)?;
        // A soft-deleted latest version comes back with null data.
        let data = body.data.data.ok_or(BackendFault::NotFound)?;
        Ok(flatten(data))
    }

    fn write_secret(&self, path: &str, data: &SecretData) -> Result<(), BackendFault> {
        let body = serde_json::json!({ "data": data });
        self.send(self.client.post(self.endpoint("data", path)?).json(&body))
            .map(|_| ())
    }

    fn delete_secret(&self, path: &str) -> Result<(), BackendFault> {
        self.send(self.client.delete(self.endpoint("metadata", path)?))
            .map(|_| ())
    }
}

fn check_status(status: StatusCode) -> Result<(), BackendFault> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(BackendFault::NotFound),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(BackendFault::Unauthorized),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Err(BackendFault::Timeout),
        other => Err(BackendFault::transport(format!("unexpected status {other}"))),
    }
}

fn fault_from_transport(err: reqwest::Error) -> BackendFault {
    if err.is_timeout() {
        BackendFault::Timeout
    } else {
        BackendFault::transport(err.without_url().to_string())
    }
}

/// KV v2 values are arbitrary JSON; non-string values keep their JSON text.
fn flatten(data: Map<String, Value>) -> SecretData {
    data.into_iter()
        .map(|(key, value)| match value {
            Value::String(text) => (key, text),
            other => (key, other.to_string()),
        })
        .collect()
}

impl std::fmt::Debug for VaultKvBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKvBackend")
            .field("address", &self.address.as_str())
            .field("mount", &self.mount)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
