use crate::integrations::backend_models::parse_lead_list;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{Download, Lead, Persona, UploadFile};
use async_trait::async_trait;
use reqwest::{header, RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Header carrying the backend API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// HTTP mechanics shared by both persona gateways: base URL, API key and the
/// pooled `reqwest` client.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    timeout: Duration,
}

impl BackendClient {
    /// Builds the shared `reqwest` client. Only a connect timeout is set here;
    /// JSON calls add a per-request timeout so event streams can stay open.
    pub fn http_client() -> Result<reqwest::Client, AppError> {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to create HTTP client: {}", e)))
    }

    /// Creates a new `BackendClient`.
    ///
    /// # Arguments
    ///
    /// * `client` - Pooled HTTP client.
    /// * `base_url` - The base URL of the backend API.
    /// * `api_key` - The API key for authentication.
    /// * `timeout` - Per-request timeout for JSON calls.
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::Configuration(format!("Invalid backend URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "Backend URL '{}' cannot be used as a base",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            timeout,
        })
    }

    /// Creates a client from configuration, failing with a configuration error
    /// when the backend URL or API key is missing.
    pub fn from_config(client: reqwest::Client, config: &Config) -> Result<Self, AppError> {
        let (base_url, api_key) = config.backend_credentials()?;
        Self::new(client, base_url, api_key, config.backend_timeout)
    }

    /// Joins `prefix` and `segments` onto the base URL, percent-encoding each
    /// segment.
    pub fn endpoint(&self, prefix: &str, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Configuration("Backend URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(prefix)
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(API_KEY_HEADER, &self.api_key)
    }

    /// Sends a request and checks the status, returning the raw response.
    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, AppError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("{} request failed: {}", what, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("Backend {} returned {}: {}", what, status, error_text);
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body: error_text,
            });
        }

        Ok(response)
    }

    /// Sends a JSON request. Empty bodies become `null`; non-JSON bodies are
    /// returned as a JSON string.
    async fn send_json(&self, builder: RequestBuilder, what: &str) -> Result<Value, AppError> {
        let response = self.send(builder.timeout(self.timeout), what).await?;
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read {} response: {}", what, e)))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    pub async fn get_json(&self, url: Url) -> Result<Value, AppError> {
        tracing::debug!("GET {}", url);
        let what = url.path().to_string();
        self.send_json(self.client.get(url), &what).await
    }

    pub async fn post_json(&self, url: Url, body: Option<&Value>) -> Result<Value, AppError> {
        tracing::debug!("POST {}", url);
        let what = url.path().to_string();
        let mut builder = self.client.post(url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send_json(builder, &what).await
    }

    pub async fn patch_json(&self, url: Url, body: &Value) -> Result<Value, AppError> {
        tracing::debug!("PATCH {}", url);
        let what = url.path().to_string();
        self.send_json(self.client.patch(url).json(body), &what).await
    }

    pub async fn post_multipart(
        &self,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<Value, AppError> {
        tracing::debug!("POST multipart {}", url);
        let what = url.path().to_string();
        self.send_json(self.client.post(url).multipart(form), &what)
            .await
    }

    /// Downloads a raw body, keeping its content type and disposition.
    pub async fn get_bytes(&self, url: Url) -> Result<Download, AppError> {
        tracing::debug!("GET (download) {}", url);
        let what = url.path().to_string();
        let response = self
            .send(self.client.get(url).timeout(self.timeout), &what)
            .await?;

        let header_text = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type =
            header_text(header::CONTENT_TYPE).unwrap_or_else(|| "application/octet-stream".into());
        let content_disposition = header_text(header::CONTENT_DISPOSITION);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read {} body: {}", what, e)))?;

        Ok(Download {
            content_type,
            content_disposition,
            bytes: bytes.to_vec(),
        })
    }

    /// Opens a long-lived event stream. The status is not checked so the
    /// caller can pass it through unchanged.
    pub async fn open_stream(&self, url: Url) -> Result<Response, AppError> {
        tracing::info!("Opening event stream {}", url);
        self.authorized(self.client.get(url))
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Event stream connection failed: {}", e)))
    }
}

/// Rejects blank identifiers before any network call.
fn require_id<'a>(id: &'a str, what: &str) -> Result<&'a str, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest(format!("Missing {} id", what)));
    }
    Ok(id)
}

/// Backend operations used by the dashboard.
///
/// Both personas expose exactly this contract; implementations only choose
/// the path prefix every call is scoped under.
#[async_trait]
pub trait LeadGateway: Send + Sync {
    /// Persona this gateway serves.
    fn persona(&self) -> Persona;

    /// First path segment of every backend call.
    fn path_prefix(&self) -> &'static str;

    /// Shared HTTP client.
    fn backend(&self) -> &BackendClient;

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        self.backend().endpoint(self.path_prefix(), segments)
    }

    /// Fetches every lead, normalized to the canonical shape.
    async fn list_all_leads(&self) -> Result<Vec<Lead>, AppError> {
        let payload = self.backend().get_json(self.endpoint(&["leads"])?).await?;
        let leads = parse_lead_list(payload)?;
        tracing::info!("Fetched {} leads ({})", leads.len(), self.persona());
        Ok(leads)
    }

    /// Uploads lead files as multipart form data under the `files` field.
    async fn upload_lead_files(&self, files: Vec<UploadFile>) -> Result<Value, AppError> {
        if files.is_empty() {
            return Err(AppError::BadRequest("No files to upload".to_string()));
        }

        let count = files.len();
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(content_type) = file.content_type {
                part = part.mime_str(&content_type).map_err(|e| {
                    AppError::BadRequest(format!("Invalid content type '{}': {}", content_type, e))
                })?;
            }
            form = form.part("files", part);
        }

        tracing::info!("Uploading {} lead file(s) ({})", count, self.persona());
        self.backend()
            .post_multipart(self.endpoint(&["leads", "upload"])?, form)
            .await
    }

    async fn approve_lead(&self, lead_id: &str) -> Result<Value, AppError> {
        let id = require_id(lead_id, "lead")?;
        tracing::info!("Approving lead {} ({})", id, self.persona());
        self.backend()
            .post_json(self.endpoint(&["leads", id, "approve"])?, None)
            .await
    }

    async fn reject_lead(&self, lead_id: &str) -> Result<Value, AppError> {
        let id = require_id(lead_id, "lead")?;
        tracing::info!("Rejecting lead {} ({})", id, self.persona());
        self.backend()
            .post_json(self.endpoint(&["leads", id, "reject"])?, None)
            .await
    }

    async fn update_lead_content(&self, lead_id: &str, body: Value) -> Result<Value, AppError> {
        let id = require_id(lead_id, "lead")?;
        self.backend()
            .patch_json(self.endpoint(&["leads", id, "content"])?, &body)
            .await
    }

    async fn dashboard_stats(&self) -> Result<Value, AppError> {
        self.backend()
            .get_json(self.endpoint(&["dashboard", "stats"])?)
            .await
    }

    async fn dashboard_distribution(&self) -> Result<Value, AppError> {
        self.backend()
            .get_json(self.endpoint(&["dashboard", "distribution"])?)
            .await
    }

    async fn list_campaigns(&self) -> Result<Value, AppError> {
        self.backend().get_json(self.endpoint(&["campaigns"])?).await
    }

    async fn get_campaign(&self, campaign_id: &str) -> Result<Value, AppError> {
        let id = require_id(campaign_id, "campaign")?;
        self.backend()
            .get_json(self.endpoint(&["campaigns", id])?)
            .await
    }

    async fn create_campaign(&self, body: Value) -> Result<Value, AppError> {
        if !body.is_object() {
            return Err(AppError::BadRequest(
                "Campaign body must be a JSON object".to_string(),
            ));
        }
        tracing::info!("Creating campaign ({})", self.persona());
        self.backend()
            .post_json(self.endpoint(&["campaigns"])?, Some(&body))
            .await
    }

    async fn stop_campaign(&self, campaign_id: &str) -> Result<Value, AppError> {
        let id = require_id(campaign_id, "campaign")?;
        tracing::info!("Stopping campaign {} ({})", id, self.persona());
        self.backend()
            .post_json(self.endpoint(&["campaigns", id, "stop"])?, None)
            .await
    }

    async fn export_campaign(&self, campaign_id: &str) -> Result<Download, AppError> {
        let id = require_id(campaign_id, "campaign")?;
        self.backend()
            .get_bytes(self.endpoint(&["campaigns", id, "export"])?)
            .await
    }

    async fn list_replies(&self) -> Result<Value, AppError> {
        self.backend().get_json(self.endpoint(&["replies"])?).await
    }

    async fn list_message_statuses(&self) -> Result<Value, AppError> {
        self.backend()
            .get_json(self.endpoint(&["messages", "status"])?)
            .await
    }

    async fn mark_reply_read(&self, reply_id: &str) -> Result<Value, AppError> {
        let id = require_id(reply_id, "reply")?;
        self.backend()
            .post_json(self.endpoint(&["replies", id, "read"])?, None)
            .await
    }

    async fn whatsapp_inbound(&self) -> Result<Value, AppError> {
        self.backend()
            .get_json(self.endpoint(&["whatsapp", "inbound"])?)
            .await
    }

    async fn whatsapp_notifications(&self) -> Result<Value, AppError> {
        self.backend()
            .get_json(self.endpoint(&["whatsapp", "notifications"])?)
            .await
    }

    async fn whatsapp_unread_count(&self) -> Result<Value, AppError> {
        self.backend()
            .get_json(self.endpoint(&["whatsapp", "unread-count"])?)
            .await
    }

    async fn whatsapp_mark_read(&self, message_id: &str) -> Result<Value, AppError> {
        let id = require_id(message_id, "message")?;
        self.backend()
            .post_json(self.endpoint(&["whatsapp", id, "read"])?, None)
            .await
    }

    async fn open_whatsapp_stream(&self) -> Result<Response, AppError> {
        self.backend()
            .open_stream(self.endpoint(&["whatsapp", "stream"])?)
            .await
    }
}

/// Gateway scoped to the sales dataset.
#[derive(Clone)]
pub struct SalesGateway {
    backend: BackendClient,
}

impl SalesGateway {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl LeadGateway for SalesGateway {
    fn persona(&self) -> Persona {
        Persona::Sales
    }

    fn path_prefix(&self) -> &'static str {
        "sales"
    }

    fn backend(&self) -> &BackendClient {
        &self.backend
    }
}

/// Gateway scoped to the delegates dataset.
#[derive(Clone)]
pub struct DelegatesGateway {
    backend: BackendClient,
}

impl DelegatesGateway {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl LeadGateway for DelegatesGateway {
    fn persona(&self) -> Persona {
        Persona::Delegates
    }

    fn path_prefix(&self) -> &'static str {
        "delegates"
    }

    fn backend(&self) -> &BackendClient {
        &self.backend
    }
}

/// Selects the gateway implementation for `persona`.
pub fn gateway_for(persona: Persona, backend: BackendClient) -> Arc<dyn LeadGateway> {
    match persona {
        Persona::Sales => Arc::new(SalesGateway::new(backend)),
        Persona::Delegates => Arc::new(DelegatesGateway::new(backend)),
    }
}
