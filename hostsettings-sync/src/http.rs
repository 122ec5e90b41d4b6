//! HTTP implementation of the remote settings endpoint.
//!
//! Talks JSON to a host-management gateway using a pre-issued session token:
//!
//! - `GET  /api/hosts/{host_id}` resolves a host
//! - `GET  /api/hosts/{moid}/advanced-settings?name={name}` queries options
//! - `PUT  /api/hosts/{moid}/advanced-settings/{name}` updates one option
//! - `GET  /api/hosts/{moid}/advanced-settings/supported` lists the catalogue

use crate::client::{HostRef, HostResolver, RemoteOption, SettingsClient};
use crate::error::{SettingsError, SettingsResult};
use async_trait::async_trait;
use hostsettings_types::{HostId, SettingDescriptor, ValueType};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::debug;

/// HTTP endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Base URL of the management gateway (e.g. `https://vcenter.lab`).
    pub base_url: String,
    /// Session token sent as a bearer credential.
    pub session_token: String,
    /// Per-request transport timeout (in seconds).
    pub request_timeout_secs: u64,
    /// Accept self-signed certificates (lab hosts only).
    pub accept_invalid_certs: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost".to_string(),
            session_token: String::new(),
            request_timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

/// Wire shapes.
#[derive(Debug, Deserialize)]
struct HostResponse {
    moid: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct OptionList {
    #[serde(default)]
    options: Vec<WireOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOptionType {
    #[serde(deserialize_with = "value_type_name")]
    value_type: ValueType,
    #[serde(default)]
    read_only: bool,
    #[serde(default)]
    choices: Vec<String>,
}

/// Accepts type names in any case (`"long"`, `"Long"`).
fn value_type_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ValueType, D::Error> {
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
struct WireOption {
    key: String,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(rename = "type")]
    option_type: WireOptionType,
}

impl WireOption {
    fn into_descriptor(self) -> SettingDescriptor {
        SettingDescriptor {
            key: self.key,
            value_type: self.option_type.value_type,
            read_only: self.option_type.read_only,
            choices: self.option_type.choices,
        }
    }
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    #[serde(default)]
    value: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct FaultBody {
    #[serde(default)]
    fault: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Renders a JSON scalar the way the host would print it.
fn wire_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Settings client backed by the management gateway's HTTP API.
pub struct HttpSettingsClient {
    config: HttpClientConfig,
    client: Client,
}

impl HttpSettingsClient {
    /// Creates a client for the configured gateway.
    pub fn new(config: HttpClientConfig) -> SettingsResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| SettingsError::Unavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn settings_url(&self, host: &HostRef) -> String {
        format!(
            "{}/api/hosts/{}/advanced-settings",
            self.base(),
            urlencoding::encode(&host.moid)
        )
    }

    /// Maps a non-success response to an error. `not_found` builds the 404
    /// error for the call at hand. Only an update can fail as read-only or
    /// with a rejected value; reads surface those statuses as unavailable.
    async fn fault(
        response: Response,
        update: Option<(&str, &str)>,
        not_found: impl FnOnce(String) -> SettingsError,
    ) -> SettingsError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let fault: FaultBody = serde_json::from_str(&body).unwrap_or_default();
        let detail = fault
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| if body.is_empty() { status.to_string() } else { body });

        match (status, update) {
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => SettingsError::Denied(detail),
            (StatusCode::NOT_FOUND, _) => not_found(detail),
            (StatusCode::CONFLICT, Some((key, _))) => SettingsError::ReadOnly(key.to_string()),
            (_, Some((key, _))) if fault.fault.as_deref() == Some("ReadOnly") => {
                SettingsError::ReadOnly(key.to_string())
            }
            (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, Some((key, value))) => {
                SettingsError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: detail,
                    allowed: Vec::new(),
                }
            }
            _ => SettingsError::Unavailable(format!("{status}: {detail}")),
        }
    }
}

#[async_trait]
impl HostResolver for HttpSettingsClient {
    async fn resolve(&self, host_id: &HostId) -> SettingsResult<HostRef> {
        let response = self
            .client
            .get(format!(
                "{}/api/hosts/{}",
                self.base(),
                urlencoding::encode(host_id.as_str())
            ))
            .bearer_auth(&self.config.session_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::fault(response, None, |_| {
                SettingsError::HostNotFound(host_id.to_string())
            })
            .await);
        }

        let host: HostResponse = response.json().await?;
        debug!("Host {} resolved to {}", host_id, host.moid);
        Ok(HostRef::new(host.moid, host.name))
    }
}

#[async_trait]
impl SettingsClient for HttpSettingsClient {
    fn backend_name(&self) -> &'static str {
        "HTTP gateway"
    }

    async fn query(&self, host: &HostRef, name: &str) -> SettingsResult<RemoteOption> {
        let response = self
            .client
            .get(self.settings_url(host))
            .bearer_auth(&self.config.session_token)
            .query(&[("name", name)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::fault(response, None, |_| SettingsError::NotFound {
                host: host.moid.clone(),
                name: name.to_string(),
            })
            .await);
        }

        let list: OptionList = response.json().await?;
        let option = list
            .options
            .into_iter()
            .find(|o| o.key == name)
            .ok_or_else(|| SettingsError::NotFound {
                host: host.moid.clone(),
                name: name.to_string(),
            })?;

        let value = wire_string(option.value.clone());
        Ok(RemoteOption {
            descriptor: option.into_descriptor(),
            value,
        })
    }

    async fn update(&self, host: &HostRef, name: &str, value: &str) -> SettingsResult<String> {
        let response = self
            .client
            .put(format!(
                "{}/{}",
                self.settings_url(host),
                urlencoding::encode(name)
            ))
            .bearer_auth(&self.config.session_token)
            .json(&UpdateRequest { value })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::fault(response, Some((name, value)), |_| {
                SettingsError::NotFound {
                    host: host.moid.clone(),
                    name: name.to_string(),
                }
            })
            .await);
        }

        // An empty 2xx body confirms the value as sent.
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(value.to_string());
        }
        let updated: UpdateResponse = serde_json::from_str(&body)
            .map_err(|e| SettingsError::Unavailable(format!("undecodable update response: {e}")))?;
        Ok(updated
            .value
            .map_or_else(|| value.to_string(), wire_string))
    }

    async fn supported(&self, host: &HostRef) -> SettingsResult<Vec<SettingDescriptor>> {
        let response = self
            .client
            .get(format!("{}/supported", self.settings_url(host)))
            .bearer_auth(&self.config.session_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::fault(response, None, |_| {
                SettingsError::HostNotFound(host.moid.clone())
            })
            .await);
        }

        let list: OptionList = response.json().await?;
        Ok(list
            .options
            .into_iter()
            .map(WireOption::into_descriptor)
            .collect())
    }
}
