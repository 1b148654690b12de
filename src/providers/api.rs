use super::util::{RetryPolicy, with_retry};
use crate::core::config::ApiConfig;
use crate::core::form::NewFraction;
use crate::core::fraction::{FractionProvider, FractionRecord};
use crate::core::money::{normalize_location, parse_fraction};
use crate::core::session::{Session, SessionUser, User};
use crate::core::unit::UnitType;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// A JSON value the API sends either as a number or as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FractionResponse {
    #[serde(default)]
    id: Option<u64>,
    location: Scalar,
    #[serde(rename = "type")]
    unit_type: String,
    #[serde(default)]
    fraction: Option<Scalar>,
}

impl FractionResponse {
    fn into_record(self) -> Result<FractionRecord> {
        let unit_type: UnitType = self.unit_type.parse()?;
        let raw_location = self.location.as_text();
        let location = match normalize_location(&raw_location) {
            Ok(Some(location)) => location,
            Ok(None) => bail!("Fraction record {:?} has no location", self.id),
            Err(e) => bail!("Fraction record {:?} location '{raw_location}': {e}", self.id),
        };
        let fraction = self
            .fraction
            .as_ref()
            .and_then(|raw| parse_fraction(&raw.as_text()));
        if fraction.is_none() {
            debug!(id = ?self.id, raw = ?self.fraction, "Fraction value is not numeric");
        }
        Ok(FractionRecord {
            id: self.id,
            location,
            unit_type,
            fraction,
        })
    }
}

#[derive(Debug, Serialize)]
struct FractionBody<'a> {
    location: &'a str,
    #[serde(rename = "type")]
    unit_type: UnitType,
    fraction: f64,
}

impl<'a> FractionBody<'a> {
    fn from_new(fraction: &'a NewFraction) -> Result<Self> {
        Ok(Self {
            location: &fraction.location,
            unit_type: fraction.unit_type,
            fraction: fraction
                .fraction
                .to_f64()
                .context("Fraction cannot be represented as a number")?,
        })
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: User,
    token: String,
}

/// Client for the condominium REST API.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    session: Session,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Session) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("rateio/0.1")
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            session,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn resource_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attaches the bearer token current at the time of the call.
    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(&self, response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(%action, "Request was not authorized, clearing session");
            self.session.logout().await;
            bail!("{action} was not authorized. Please log in again.");
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%action, %status, %body, "Request failed");
            bail!("{action} failed with status {status}");
        }
        Ok(response)
    }

    async fn get(&self, path: &str, action: &str) -> Result<Response> {
        let url = self.resource_url(path);
        debug!("Requesting {}", url);
        let response = with_retry(
            || async { self.authorized(self.client.get(&url)).await.send().await },
            self.retry,
        )
        .await
        .with_context(|| format!("{action} request failed"))?;
        self.check(response, action).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser> {
        let url = format!("{}/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .context("Login request failed")?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(%email, "Login rejected");
            bail!("Invalid email or password");
        }
        let response = self.check(response, "Login").await?;

        let logged: LoginResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;
        if logged.token.is_empty() {
            bail!("Login response did not include a token");
        }

        self.session.login(&logged.user, &logged.token).await?;
        self.session
            .current_user()
            .await
            .ok_or_else(|| anyhow!("Session could not be stored"))
    }

    pub async fn list_fractions(&self) -> Result<Vec<FractionRecord>> {
        let response = self.get("fractions", "Fetching fractions").await?;
        let text = response
            .text()
            .await
            .context("Failed to get fractions response text")?;

        let items: Vec<FractionResponse> = match serde_json::from_str(&text) {
            Ok(items) => items,
            Err(e) => {
                error!(error = ?e, response = %text, "Failed to parse fractions response");
                return Err(e).context("Failed to parse fractions response");
            }
        };

        Ok(items
            .into_iter()
            .filter_map(|item| match item.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping fraction record");
                    None
                }
            })
            .collect())
    }

    pub async fn get_fraction(&self, id: u64) -> Result<FractionRecord> {
        let response = self
            .get(&format!("fraction/{id}"), &format!("Fetching fraction {id}"))
            .await?;
        let item: FractionResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse fraction {id}"))?;
        item.into_record()
    }

    pub async fn create_fraction(&self, fraction: &NewFraction) -> Result<()> {
        let body = FractionBody::from_new(fraction)?;
        let request = self
            .authorized(self.client.post(self.resource_url("fraction/create")))
            .await
            .json(&body);
        let response = request.send().await.context("Create request failed")?;
        self.check(response, "Creating fraction").await?;
        Ok(())
    }

    pub async fn update_fraction(&self, id: u64, fraction: &NewFraction) -> Result<()> {
        let body = FractionBody::from_new(fraction)?;
        let request = self
            .authorized(
                self.client
                    .put(self.resource_url(&format!("fraction/update/{id}"))),
            )
            .await
            .json(&body);
        let response = request.send().await.context("Update request failed")?;
        self.check(response, &format!("Updating fraction {id}"))
            .await?;
        Ok(())
    }

    pub async fn delete_fraction(&self, id: u64) -> Result<()> {
        let request = self
            .authorized(
                self.client
                    .delete(self.resource_url(&format!("fraction/delete/{id}"))),
            )
            .await;
        let response = request.send().await.context("Delete request failed")?;
        self.check(response, &format!("Deleting fraction {id}"))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FractionProvider for ApiClient {
    async fn fetch_fractions(&self) -> Result<Vec<FractionRecord>> {
        self.list_fractions().await
    }
}
