//! vSphere Automation REST client
//!
//! Logs in with basic auth to obtain an API session id, then drives clones,
//! guest customization and power state through `/api/vcenter`.

use crate::config::VmwareConfig;
use crate::error::{Result, VmwareError};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use terraflow_cloud::{Connection, Ip4, VmwareCredentials};

const SESSION_HEADER: &str = "vmware-api-session-id";

/// A VM as listed by `/api/vcenter/vm`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VmSummary {
    pub vm: String,
    pub name: String,
    #[serde(default)]
    pub power_state: String,
}

/// Clone `source` into a new VM called `name`
#[derive(Debug, Clone, Serialize)]
pub struct CloneRequest {
    pub source: String,
    pub name: String,
    pub power_on: bool,
}

/// Static IPv4 settings applied to a cloned guest before first boot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestNetwork {
    pub hostname: String,
    pub domain: String,
    pub address: Ip4,
    pub prefix: u8,
    pub gateway: Ip4,
}

impl GuestNetwork {
    fn customization_spec(&self) -> serde_json::Value {
        serde_json::json!({
            "spec": {
                "configuration_spec": {
                    "linux_config": {
                        "hostname": { "type": "FIXED", "fixed_name": self.hostname },
                        "domain": self.domain,
                    }
                },
                "global_DNS_settings": {},
                "interfaces": [{
                    "adapter": {
                        "ipv4": {
                            "type": "STATIC",
                            "ip_address": self.address.to_string(),
                            "prefix": self.prefix,
                            "gateways": [self.gateway.to_string()],
                        }
                    }
                }]
            }
        })
    }
}

/// vCenter connection handle
pub struct VsphereClient {
    client: reqwest::Client,
    base_url: String,
    credentials: VmwareCredentials,
    session_id: Mutex<Option<String>>,
}

impl VsphereClient {
    pub fn new(config: &VmwareConfig, credentials: VmwareCredentials) -> Result<Self> {
        let base_url = config
            .url
            .clone()
            .unwrap_or_else(|| credentials.url.clone());
        if base_url.is_empty() {
            return Err(VmwareError::InvalidConfig(
                "no vCenter URL in config or credentials".to_string(),
            ));
        }
        parse_url(&base_url)?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            session_id: Mutex::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn cached_session(&self) -> Option<String> {
        self.session_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.cached_session().is_some()
    }

    /// Create an API session and cache its id
    pub async fn login(&self) -> Result<String> {
        tracing::debug!(url = %self.base_url, user = %self.credentials.username, "Logging in to vCenter");

        let response = self
            .client
            .post(self.session_url())
            .basic_auth(
                &self.credentials.username,
                Some(self.credentials.password.expose()),
            )
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(VmwareError::AuthenticationFailed(format!(
                "{}: {}",
                status.as_u16(),
                api_error_message(&body)
            )));
        }

        let session_id: String = serde_json::from_str(&body)?;
        *self.session_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(session_id.clone());
        Ok(session_id)
    }

    async fn session(&self) -> Result<String> {
        match self.cached_session() {
            Some(id) => Ok(id),
            None => self.login().await,
        }
    }

    fn vm_search_url(&self, name: &str) -> Result<reqwest::Url> {
        let mut url = parse_url(&format!("{}/api/vcenter/vm", self.base_url))?;
        url.query_pairs_mut().append_pair("names", name);
        Ok(url)
    }

    fn session_url(&self) -> String {
        format!("{}/api/session", self.base_url)
    }

    pub async fn find_vm(&self, name: &str) -> Result<Option<VmSummary>> {
        let url = self.vm_search_url(name)?;
        let session = self.session().await?;
        let response = self
            .client
            .get(url)
            .header(SESSION_HEADER, session)
            .send()
            .await?;

        let vms: Vec<VmSummary> = decode(response).await?;
        Ok(vms.into_iter().find(|vm| vm.name == name))
    }

    /// Clone a template by name and return the new VM id
    pub async fn clone_vm(&self, template: &str, name: &str) -> Result<String> {
        let source = self
            .find_vm(template)
            .await?
            .ok_or_else(|| VmwareError::VmNotFound(template.to_string()))?;

        let request = CloneRequest {
            source: source.vm,
            name: name.to_string(),
            power_on: false,
        };

        tracing::info!("Cloning {} from template {}", name, template);
        let session = self.session().await?;
        let response = self
            .client
            .post(format!("{}/api/vcenter/vm?action=clone", self.base_url))
            .header(SESSION_HEADER, session)
            .json(&request)
            .send()
            .await?;

        decode(response).await
    }

    pub async fn customize_guest(&self, vm: &str, network: &GuestNetwork) -> Result<()> {
        tracing::info!("Assigning {} to {}", network.address, vm);
        let session = self.session().await?;
        let response = self
            .client
            .put(format!("{}/api/vcenter/vm/{}/guest/customization", self.base_url, vm))
            .header(SESSION_HEADER, session)
            .json(&network.customization_spec())
            .send()
            .await?;

        expect_empty(response).await
    }

    pub async fn power_on(&self, vm: &str) -> Result<()> {
        self.power(vm, "start").await
    }

    pub async fn power_off(&self, vm: &str) -> Result<()> {
        self.power(vm, "stop").await
    }

    async fn power(&self, vm: &str, action: &str) -> Result<()> {
        let session = self.session().await?;
        let response = self
            .client
            .post(format!("{}/api/vcenter/vm/{}/power?action={}", self.base_url, vm, action))
            .header(SESSION_HEADER, session)
            .send()
            .await?;

        expect_empty(response).await
    }

    pub async fn delete_vm(&self, vm: &str) -> Result<()> {
        tracing::info!("Deleting VM {}", vm);
        let session = self.session().await?;
        let response = self
            .client
            .delete(format!("{}/api/vcenter/vm/{}", self.base_url, vm))
            .header(SESSION_HEADER, session)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        expect_empty(response).await
    }
}

impl VsphereClient {
    fn take_session(&self) -> Option<String> {
        self.session_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// End the API session on the vCenter side
    pub async fn logout(&self) -> Result<()> {
        match self.take_session() {
            Some(session) => end_session(&self.client, &self.session_url(), &session).await,
            None => Ok(()),
        }
    }
}

impl Connection for VsphereClient {
    /// Forget the session id and end the session on the server in the
    /// background. Outside a tokio runtime the session is left to expire.
    fn shutdown(&self) -> anyhow::Result<()> {
        let Some(session) = self.take_session() else {
            return Ok(());
        };
        let url = self.session_url();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime to end vCenter session at {}; it will expire", url);
            return Ok(());
        };

        let client = self.client.clone();
        runtime.spawn(async move {
            match end_session(&client, &url, &session).await {
                Ok(()) => tracing::debug!("Ended vCenter session at {}", url),
                Err(e) => tracing::warn!("Failed to end vCenter session at {}: {}", url, e),
            }
        });
        Ok(())
    }
}

async fn end_session(client: &reqwest::Client, url: &str, session: &str) -> Result<()> {
    let response = client
        .delete(url)
        .header(SESSION_HEADER, session)
        .send()
        .await?;

    // already expired
    if response.status() == reqwest::StatusCode::UNAUTHORIZED {
        return Ok(());
    }
    expect_empty(response).await
}

fn parse_url(raw: &str) -> Result<reqwest::Url> {
    reqwest::Url::parse(raw)
        .map_err(|e| VmwareError::InvalidConfig(format!("bad vCenter URL '{raw}': {e}")))
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(VmwareError::ApiError {
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }
    Ok(serde_json::from_str(&body)?)
}

async fn expect_empty(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await?;
    Err(VmwareError::ApiError {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    error_type: String,
    #[serde(default)]
    messages: Vec<LocalizedMessage>,
}

#[derive(Debug, Deserialize)]
struct LocalizedMessage {
    default_message: String,
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) => match err.messages.first() {
            Some(msg) => msg.default_message.clone(),
            None if !err.error_type.is_empty() => err.error_type,
            None => body.trim().to_string(),
        },
        Err(_) => body.trim().to_string(),
    }
}
