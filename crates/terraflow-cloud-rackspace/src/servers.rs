//! Rackspace Cloud Servers API client
//!
//! Authenticates against the identity service with an API key, resolves the
//! regional Cloud Servers endpoint from the service catalog, and caches the
//! token until the connection is shut down.

use crate::config::RackspaceConfig;
use crate::error::{RackspaceError, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use terraflow_cloud::{Connection, RackspaceCredentials};

const SERVERS_SERVICE: &str = "cloudServersOpenStack";

/// Token and endpoint returned by the identity service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub id: String,
    pub servers_endpoint: String,
}

/// A server as reported by Cloud Servers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Server {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "accessIPv4", default)]
    pub access_ipv4: String,
    #[serde(rename = "adminPass", default)]
    pub admin_pass: Option<String>,
}

impl Server {
    pub fn is_active(&self) -> bool {
        self.status == "ACTIVE"
    }

    pub fn is_error(&self) -> bool {
        self.status == "ERROR"
    }
}

/// Parameters for booting a server
#[derive(Debug, Clone, Serialize)]
pub struct ServerRequest {
    pub name: String,
    #[serde(rename = "imageRef")]
    pub image_ref: String,
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
}

/// Cloud Servers connection handle
pub struct CloudServersClient {
    client: reqwest::Client,
    config: RackspaceConfig,
    credentials: RackspaceCredentials,
    token: Mutex<Option<AuthToken>>,
}

impl CloudServersClient {
    pub fn new(config: RackspaceConfig, credentials: RackspaceCredentials) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            config,
            credentials,
            token: Mutex::new(None),
        })
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    fn cached_token(&self) -> Option<AuthToken> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.cached_token().is_some()
    }

    /// Fetch a new token from the identity service and cache it
    pub async fn authenticate(&self) -> Result<AuthToken> {
        tracing::debug!(
            user = %self.credentials.username,
            region = %self.config.region,
            "Authenticating with Rackspace identity"
        );

        let response = self
            .client
            .post(self.config.tokens_url())
            .json(&auth_request(&self.credentials))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RackspaceError::AuthenticationFailed(format!(
                "{}: {}",
                status.as_u16(),
                api_error_message(&body)
            )));
        }

        let parsed: AuthResponse = serde_json::from_str(&body)?;
        let token = parsed.into_token(&self.config.region)?;
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(token)
    }

    async fn token(&self) -> Result<AuthToken> {
        match self.cached_token() {
            Some(token) => Ok(token),
            None => self.authenticate().await,
        }
    }

    /// Boot a server. The returned record carries the admin password.
    pub async fn create_server(&self, request: &ServerRequest) -> Result<Server> {
        let token = self.token().await?;
        let url = format!("{}/servers", token.servers_endpoint);

        tracing::info!("Creating Rackspace server: {}", request.name);
        let response = self
            .client
            .post(&url)
            .header("X-Auth-Token", &token.id)
            .json(&ServerEnvelope { server: request })
            .send()
            .await?;

        let envelope: ServerEnvelope<Server> = decode(response).await?;
        Ok(envelope.server)
    }

    pub async fn get_server(&self, id: &str) -> Result<Server> {
        let token = self.token().await?;
        let url = format!("{}/servers/{}", token.servers_endpoint, id);

        let response = self
            .client
            .get(&url)
            .header("X-Auth-Token", &token.id)
            .send()
            .await?;

        let envelope: ServerEnvelope<Server> = decode(response).await?;
        Ok(envelope.server)
    }

    pub async fn delete_server(&self, id: &str) -> Result<()> {
        let token = self.token().await?;
        let url = format!("{}/servers/{}", token.servers_endpoint, id);

        tracing::info!("Deleting Rackspace server: {}", id);
        let response = self
            .client
            .delete(&url)
            .header("X-Auth-Token", &token.id)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        let body = response.text().await?;
        Err(RackspaceError::ApiError {
            status: status.as_u16(),
            message: api_error_message(&body),
        })
    }
}

impl Connection for CloudServersClient {
    fn shutdown(&self) -> anyhow::Result<()> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(RackspaceError::ApiError {
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }
    Ok(serde_json::from_str(&body)?)
}

// ============ API Types ============

fn auth_request(credentials: &RackspaceCredentials) -> serde_json::Value {
    serde_json::json!({
        "auth": {
            "RAX-KSKEY:apiKeyCredentials": {
                "username": credentials.username,
                "apiKey": credentials.api_key.expose(),
            }
        }
    })
}

/// Error bodies look like `{"itemNotFound": {"message": "...", "code": 404}}`
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .as_object()?
                .values()
                .find_map(|fault| fault.get("message")?.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Debug, Serialize, Deserialize)]
struct ServerEnvelope<T> {
    server: T,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access: Access,
}

#[derive(Debug, Deserialize)]
struct Access {
    token: TokenInfo,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[derive(Debug, Deserialize)]
struct Endpoint {
    #[serde(default)]
    region: Option<String>,
    #[serde(rename = "publicURL")]
    public_url: String,
}

impl AuthResponse {
    fn into_token(self, region: &str) -> Result<AuthToken> {
        let endpoint = self
            .access
            .service_catalog
            .into_iter()
            .filter(|entry| entry.name == SERVERS_SERVICE)
            .flat_map(|entry| entry.endpoints)
            .find(|endpoint| {
                endpoint
                    .region
                    .as_deref()
                    .is_some_and(|r| r.eq_ignore_ascii_case(region))
            })
            .ok_or_else(|| RackspaceError::EndpointNotFound {
                service: SERVERS_SERVICE.to_string(),
                region: region.to_string(),
            })?;

        Ok(AuthToken {
            id: self.access.token.id,
            servers_endpoint: endpoint.public_url.trim_end_matches('/').to_string(),
        })
    }
}
