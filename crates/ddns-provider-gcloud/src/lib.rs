// # Google Cloud DNS Zone Store
//
// This crate provides the Google Cloud DNS implementation of
// `ZoneRecordStore` for the DDNS reconciler.
//
// ## Behavior
//
// - Authenticates with a service account key (OAuth2 JWT-bearer grant)
// - Caches the access token for the lifetime of the store (one run)
// - Lists a managed zone's record sets, following `nextPageToken`
// - Submits deletions and additions as one Cloud DNS change, which the
//   service applies atomically
// - Dry-run mode lists normally but only logs the change it would submit
// - No retry, backoff, or change-status polling: every failure is returned
//
// ## Security Requirements
//
// - The private key and access token NEVER appear in logs or `Debug` output
//
// ## API Reference
//
// - Cloud DNS API v1: https://cloud.google.com/dns/docs/reference/rest/v1
// - List record sets: GET `/projects/{project}/managedZones/{zone}/rrsets`
// - Create change: POST `/projects/{project}/managedZones/{zone}/changes`

pub mod auth;

pub use auth::ServiceAccountKey;

use async_trait::async_trait;
use ddns_core::records::{ChangeSet, ExistingRecord, NewRecordSpec, RecordType};
use ddns_core::traits::{ChangeReceipt, ZoneRecordStore};
use ddns_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use auth::{CLOUD_DNS_SCOPE, TokenResponse};

/// Cloud DNS API base URL
const CLOUD_DNS_API_BASE: &str = "https://dns.googleapis.com/dns/v1";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER: &str = "gcloud";

/// Record set as exchanged with the Cloud DNS API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct ResourceRecordSet {
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    ttl: u32,
    #[serde(default)]
    rrdatas: Vec<String>,
}

impl From<ResourceRecordSet> for ExistingRecord {
    fn from(rrset: ResourceRecordSet) -> Self {
        ExistingRecord {
            name: rrset.name,
            record_type: RecordType::from(rrset.record_type.as_str()),
            rrdatas: rrset.rrdatas,
            ttl: rrset.ttl,
        }
    }
}

impl From<&ExistingRecord> for ResourceRecordSet {
    fn from(record: &ExistingRecord) -> Self {
        Self {
            name: record.name.clone(),
            record_type: record.record_type.as_str().to_string(),
            ttl: record.ttl,
            rrdatas: record.rrdatas.clone(),
        }
    }
}

impl From<&NewRecordSpec> for ResourceRecordSet {
    fn from(spec: &NewRecordSpec) -> Self {
        Self {
            name: spec.name.clone(),
            record_type: RecordType::A.as_str().to_string(),
            ttl: spec.ttl,
            rrdatas: vec![spec.address.to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RrsetsPage {
    #[serde(default)]
    rrsets: Vec<ResourceRecordSet>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Change request body
#[derive(Debug, Serialize)]
struct ChangeRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    additions: Vec<ResourceRecordSet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    deletions: Vec<ResourceRecordSet>,
}

impl From<&ChangeSet> for ChangeRequest {
    fn from(change: &ChangeSet) -> Self {
        Self {
            additions: change.additions.iter().map(ResourceRecordSet::from).collect(),
            deletions: change.deletions.iter().map(ResourceRecordSet::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChangeResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: String,
}

/// Google Cloud DNS zone store
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the store will:
/// - Authenticate and list records as usual
/// - Log the change request it would submit
/// - **NOT** submit it, returning a receipt with status `dry-run`
pub struct CloudDnsStore {
    /// GCP project owning the managed zone
    project_id: String,

    /// Service account credentials
    key: ServiceAccountKey,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Cloud DNS API base URL
    base_url: String,

    /// OAuth2 token endpoint
    token_url: String,

    /// Access token, fetched on first use
    /// ⚠️ NEVER log this value
    access_token: RwLock<Option<String>>,

    /// Dry-run mode: if true, list records but skip the change submission
    dry_run: bool,
}

// Custom Debug implementation that hides credentials
impl std::fmt::Debug for CloudDnsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudDnsStore")
            .field("project_id", &self.project_id)
            .field("client_email", &self.key.client_email)
            .field("base_url", &self.base_url)
            .field("access_token", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudDnsStore {
    /// Create a new Cloud DNS store
    ///
    /// # Parameters
    ///
    /// - `project_id`: GCP project owning the managed zone
    /// - `key`: Service account key with the DNS Administrator role
    /// - `dry_run`: If true, list records but skip the change submission
    pub fn new(project_id: impl Into<String>, key: ServiceAccountKey, dry_run: bool) -> Result<Self> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(Error::config("Cloud DNS project id cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            project_id,
            token_url: key.token_uri.clone(),
            key,
            client,
            base_url: CLOUD_DNS_API_BASE.to_string(),
            access_token: RwLock::new(None),
            dry_run,
        })
    }

    /// Create a store from a service account key file
    pub fn from_key_file(
        project_id: impl Into<String>,
        key_file: impl AsRef<Path>,
        dry_run: bool,
    ) -> Result<Self> {
        let key = ServiceAccountKey::from_file(key_file)?;
        Self::new(project_id, key, dry_run)
    }

    /// Point the store at different API and token endpoints
    pub fn with_endpoints(mut self, base_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self.token_url = token_url.into();
        self
    }

    /// Seed the store with an access token (for testing)
    #[cfg(test)]
    fn with_access_token(self, token: impl Into<String>) -> Self {
        Self {
            access_token: RwLock::new(Some(token.into())),
            ..self
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn zone_url(&self, zone: &str) -> String {
        format!(
            "{}/projects/{}/managedZones/{}",
            self.base_url, self.project_id, zone
        )
    }

    /// Get an access token, exchanging a signed assertion on first use
    async fn access_token(&self) -> Result<String> {
        {
            let token = self.access_token.read().await;
            if let Some(ref t) = *token {
                return Ok(t.clone());
            }
        }

        let assertion = self
            .key
            .signed_assertion(CLOUD_DNS_SCOPE, chrono::Utc::now().timestamp())?;

        debug!("Requesting access token for {}", self.key.client_email);

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::http(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::auth(format!(
                "Token exchange failed: {} - {}",
                status, error_text
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("Failed to parse token response: {}", e)))?;

        let mut token = self.access_token.write().await;
        *token = Some(token_response.access_token.clone());

        Ok(token_response.access_token)
    }

    /// Send an authenticated request and decode its JSON response
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        zone: &str,
    ) -> Result<T> {
        let token = self.access_token().await?;

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::http(format!("Cloud DNS request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(self.status_error(status, &error_text, zone));
        }

        response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse response: {}", e)))
    }

    /// Map a non-success HTTP status to an error
    fn status_error(&self, status: reqwest::StatusCode, error_text: &str, zone: &str) -> Error {
        match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "Service account {} lacks access to zone {}. Status: {}",
                self.key.client_email, zone, status
            )),
            404 => Error::not_found(format!(
                "Managed zone {} in project {}",
                zone, self.project_id
            )),
            409 | 412 => Error::provider(
                PROVIDER,
                format!("Conflict: zone changed concurrently. Status: {} - {}", status, error_text),
            ),
            429 => Error::rate_limited(format!("Cloud DNS quota exceeded. Status: {}", status)),
            500..=599 => Error::provider(
                PROVIDER,
                format!("Cloud DNS server error (transient): {} - {}", status, error_text),
            ),
            _ => Error::provider(
                PROVIDER,
                format!("Cloud DNS request failed: {} - {}", status, error_text),
            ),
        }
    }
}

#[async_trait]
impl ZoneRecordStore for CloudDnsStore {
    async fn list_records(&self, zone: &str) -> Result<Vec<ExistingRecord>> {
        let url = format!("{}/rrsets", self.zone_url(zone));
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(&url);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: RrsetsPage = self.send(request, zone).await?;
            debug!("Listed {} record set(s) from {}", page.rrsets.len(), zone);
            records.extend(page.rrsets.into_iter().map(ExistingRecord::from));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(records)
    }

    async fn apply_change(&self, zone: &str, change: &ChangeSet) -> Result<ChangeReceipt> {
        let url = format!("{}/changes", self.zone_url(zone));
        let body = ChangeRequest::from(change);

        if self.dry_run {
            info!(
                "[DRY-RUN] Would send POST request to {} with payload: {}",
                url,
                serde_json::to_string(&body)?
            );
            return Ok(ChangeReceipt::new(None, "dry-run"));
        }

        let response: ChangeResponse = self.send(self.client.post(&url).json(&body), zone).await?;

        debug!(
            "Change {:?} accepted by Cloud DNS with status {}",
            response.id, response.status
        );

        Ok(ChangeReceipt::new(response.id, response.status))
    }

    fn store_name(&self) -> &'static str {
        PROVIDER
    }
}
