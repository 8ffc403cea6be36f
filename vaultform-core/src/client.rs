//! Transport to the remote secrets store.
//!
//! The store is an addressable-by-path JSON object store. `VaultStore` is
//! the seam every reconciler receives explicitly; the HTTP implementation
//! wraps a shared `reqwest` client that is safe for concurrent use across
//! reconcilers.

use anyhow::Context;
use reqwest::blocking::{Client, Response};
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value as Json};
use std::fs;
use std::time::Duration;
use vaultform_spec::{Error, Result};

/// JSON object payload exchanged with the store.
pub type JsonMap = Map<String, Json>;

/// Path-addressed JSON object store consumed by the reconcilers.
///
/// Absence is success: `read` returns `Ok(None)` for a missing object and
/// `delete` succeeds when there is nothing to remove.
pub trait VaultStore: Send + Sync {
    fn read(&self, path: &str) -> Result<Option<JsonMap>>;
    fn write(&self, path: &str, data: &JsonMap) -> Result<Option<JsonMap>>;
    fn delete(&self, path: &str) -> Result<()>;
}

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Connection settings for the Vault HTTP API.
#[derive(Clone, Debug)]
pub struct VaultConfig {
    pub addr: String,
    pub token: String,
    pub namespace: Option<String>,
    pub timeout: Duration,
    pub ca_bundle: Option<Vec<u8>>,
    pub insecure_skip_tls: bool,
}

impl VaultConfig {
    pub fn new(addr: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            token: token.into(),
            namespace: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            ca_bundle: None,
            insecure_skip_tls: false,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let addr = std::env::var("VAULT_ADDR").context("set VAULT_ADDR to the Vault server URL")?;
        let token =
            std::env::var("VAULT_TOKEN").context("set VAULT_TOKEN for Vault authentication")?;
        let namespace = std::env::var("VAULT_NAMESPACE").ok();
        let timeout = std::env::var("VAULT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let ca_bundle = std::env::var("VAULT_CA_BUNDLE")
            .ok()
            .map(|path| fs::read(path).context("failed to read VAULT_CA_BUNDLE"))
            .transpose()?;
        let insecure_skip_tls = std::env::var("VAULT_INSECURE_SKIP_TLS")
            .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE"))
            .unwrap_or(false);

        Ok(Self {
            addr,
            token,
            namespace,
            timeout,
            ca_bundle,
            insecure_skip_tls,
        })
    }

    pub fn build_store(&self) -> anyhow::Result<HttpVaultStore> {
        let mut builder = Client::builder().timeout(self.timeout);
        if let Some(ca) = self.ca_bundle.as_ref() {
            let cert = reqwest::Certificate::from_pem(ca)
                .or_else(|_| reqwest::Certificate::from_der(ca))
                .context("failed to parse VAULT_CA_BUNDLE")?;
            builder = builder.add_root_certificate(cert);
        }
        if self.insecure_skip_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build().context("failed to build Vault HTTP client")?;
        Ok(HttpVaultStore {
            config: self.clone(),
            client,
        })
    }
}

/// `VaultStore` over the Vault HTTP API.
#[derive(Clone)]
pub struct HttpVaultStore {
    config: VaultConfig,
    client: Client,
}

impl HttpVaultStore {
    fn request(
        &self,
        op: &'static str,
        method: Method,
        path: &str,
        body: Option<&JsonMap>,
    ) -> Result<Response> {
        let url = format!(
            "{}/v1/{}",
            self.config.addr.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut builder = self.client.request(method, url);
        builder = builder.header("X-Vault-Token", &self.config.token);
        if let Some(namespace) = &self.config.namespace {
            builder = builder.header("X-Vault-Namespace", namespace);
        }
        if let Some(payload) = body {
            builder = builder.json(payload);
        }
        builder.send().map_err(|err| Error::transport(op, path, err))
    }

    /// Decode a response body, unwrapping the store's `{"data": ...}`
    /// envelope when present. System endpoints answer with top-level
    /// objects; logical reads nest the payload.
    fn decode_body(path: &str, body: &str) -> Result<JsonMap> {
        let parsed: JsonMap =
            serde_json::from_str(body).map_err(|err| Error::decode(path, err))?;
        match parsed.get("data") {
            Some(Json::Object(inner)) => Ok(inner.clone()),
            _ => Ok(parsed),
        }
    }
}

impl VaultStore for HttpVaultStore {
    fn read(&self, path: &str) -> Result<Option<JsonMap>> {
        let response = self.request("read", Method::GET, path, None)?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response.text().unwrap_or_default();
                if body.trim().is_empty() {
                    return Ok(None);
                }
                Self::decode_body(path, &body).map(Some)
            }
            status => {
                let body = response.text().unwrap_or_default();
                Err(Error::transport(
                    "read",
                    path,
                    format!("{status} {body}"),
                ))
            }
        }
    }

    fn write(&self, path: &str, data: &JsonMap) -> Result<Option<JsonMap>> {
        let response = self.request("write", Method::POST, path, Some(data))?;
        let status = response.status();
        let body = response.text().unwrap_or_default();
        if !status.is_success() {
            return Err(Error::transport(
                "write",
                path,
                format!("{status} {body}"),
            ));
        }
        if body.trim().is_empty() {
            return Ok(None);
        }
        Self::decode_body(path, &body).map(Some)
    }

    fn delete(&self, path: &str) -> Result<()> {
        let response = self.request("delete", Method::DELETE, path, None)?;
        let status = response.status();
        // Deleting an object that is already gone is not a failure.
        if status == StatusCode::NOT_FOUND || status.is_success() {
            return Ok(());
        }
        let body = response.text().unwrap_or_default();
        Err(Error::transport(
            "delete",
            path,
            format!("{status} {body}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_envelope_is_unwrapped() {
        let body = r#"{"request_id":"x","data":{"iam_alias":"unique_id"}}"#;
        let decoded = HttpVaultStore::decode_body("auth/gcp/config", body).unwrap();
        assert_eq!(decoded.get("iam_alias"), Some(&json!("unique_id")));
    }

    #[test]
    fn top_level_objects_pass_through() {
        let body = r#"{"approle/":{"type":"approle"}}"#;
        let decoded = HttpVaultStore::decode_body("sys/auth", body).unwrap();
        assert!(decoded.contains_key("approle/"));
    }

    #[test]
    fn malformed_body_reports_path() {
        let err = HttpVaultStore::decode_body("sys/auth", "{not json").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
