use crate::config::Config;
use crate::errors::AppError;
use crate::gateway_client::{gateway_for, BackendClient, LeadGateway};
use crate::inbox::{InboxMonitor, RefreshOutcome};
use crate::lead_board::LeadBoard;
use crate::models::*;
use crate::persona::PersonaStore;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Pooled HTTP client reused by every backend call.
    pub http: reqwest::Client,
    /// Process-wide persona preference.
    pub persona: PersonaStore,
    /// Latest replies and message statuses.
    pub inbox: InboxMonitor,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let persona = PersonaStore::new(config.default_persona, config.persona_state_path.clone());
        Ok(Self {
            http: BackendClient::http_client()?,
            persona,
            inbox: InboxMonitor::new(),
            config,
        })
    }

    /// Gateway for the persona selected right now.
    ///
    /// Fails with a configuration error when the backend URL or API key is
    /// missing.
    pub fn gateway(&self) -> Result<Arc<dyn LeadGateway>, AppError> {
        let backend = BackendClient::from_config(self.http.clone(), &self.config)?;
        Ok(gateway_for(self.persona.get(), backend))
    }
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-dashboard-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

// ============ Persona ============

/// GET /api/v1/persona
pub async fn get_persona(State(state): State<Arc<AppState>>) -> Json<PersonaBody> {
    Json(PersonaBody {
        persona: state.persona.get(),
    })
}

/// PUT /api/v1/persona
pub async fn set_persona(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PersonaBody>,
) -> Result<Json<PersonaBody>, AppError> {
    state.persona.set(body.persona)?;
    Ok(Json(body))
}

// ============ Dashboard ============

/// GET /api/v1/dashboard/stats
pub async fn dashboard_stats(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.dashboard_stats().await?))
}

/// GET /api/v1/dashboard/distribution
pub async fn dashboard_distribution(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.dashboard_distribution().await?))
}

// ============ Campaigns ============

/// GET /api/v1/campaigns
pub async fn list_campaigns(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.list_campaigns().await?))
}

/// POST /api/v1/campaigns
pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let created = state.gateway()?.create_campaign(body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/campaigns/:id
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.get_campaign(&id).await?))
}

/// POST /api/v1/campaigns/:id/stop
pub async fn stop_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.stop_campaign(&id).await?))
}

/// GET /api/v1/campaigns/:id/export
///
/// Streams the backend's export file back with its content type and
/// disposition.
pub async fn export_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let download = state.gateway()?.export_campaign(&id).await?;
    let disposition = download
        .content_disposition
        .unwrap_or_else(|| format!("attachment; filename=\"campaign-{}.csv\"", id.trim()));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, download.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}

// ============ Leads ============

/// Query parameters of `GET /api/v1/leads`. `"all"` disables a filter.
#[derive(Debug, Default, Deserialize)]
pub struct LeadSearchParams {
    #[serde(default, alias = "query")]
    pub q: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

/// GET /api/v1/leads
///
/// Fetches every lead for the current persona, then filters and ranks them.
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeadSearchParams>,
) -> Result<Json<Vec<Lead>>, AppError> {
    tracing::info!("GET /leads - params: {:?}", params);
    let query = LeadQuery::from_params(params.q, params.event, params.position);

    let board = LeadBoard::load(state.gateway()?.as_ref()).await?;
    let leads = board.search(&query);

    tracing::info!("Returning {} of {} leads", leads.len(), board.leads().len());
    Ok(Json(leads))
}

/// GET /api/v1/leads/events
pub async fn list_lead_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, AppError> {
    let board = LeadBoard::load(state.gateway()?.as_ref()).await?;
    Ok(Json(board.event_names()))
}

/// POST /api/v1/leads/upload
///
/// Accepts one or more files under `files` (or `file`), forwards them to the
/// backend, then returns the freshly refetched lead list.
pub async fn upload_leads(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name != "files" && name != "file" {
            tracing::debug!("Ignoring multipart field '{}'", name);
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read '{}': {}", file_name, e)))?;

        files.push(UploadFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(AppError::BadRequest(
            "No files provided (expected a 'files' or 'file' field)".to_string(),
        ));
    }

    let uploaded = files.len();
    let gateway = state.gateway()?;
    let mut board = LeadBoard::default();
    let backend = board.upload(gateway.as_ref(), files).await?;

    Ok(Json(UploadResponse {
        uploaded,
        backend,
        leads: board.into_leads(),
    }))
}

/// POST /api/v1/leads/:id/approve
pub async fn approve_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.approve_lead(&id).await?))
}

/// POST /api/v1/leads/:id/reject
pub async fn reject_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.reject_lead(&id).await?))
}

/// PATCH /api/v1/leads/:id/content
pub async fn update_lead_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.update_lead_content(&id, body).await?))
}

// ============ Replies & Inbox ============

/// GET /api/v1/replies
pub async fn list_replies(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.list_replies().await?))
}

/// GET /api/v1/messages/status
pub async fn list_message_statuses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.list_message_statuses().await?))
}

/// POST /api/v1/replies/:id/read
pub async fn mark_reply_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.mark_reply_read(&id).await?))
}

/// GET /api/v1/inbox
///
/// Only data fetched under the current persona is returned.
pub async fn inbox_snapshot(State(state): State<Arc<AppState>>) -> Json<InboxSnapshot> {
    Json(state.inbox.snapshot_for(state.persona.get()).await)
}

/// POST /api/v1/inbox/refresh
///
/// Runs one refresh now. A refresh already in progress is not repeated; the
/// current snapshot is returned with `202 Accepted` instead.
pub async fn refresh_inbox(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<InboxSnapshot>), AppError> {
    let gateway = state.gateway()?;
    let status = match state.inbox.refresh(gateway.as_ref()).await {
        RefreshOutcome::Skipped => StatusCode::ACCEPTED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(state.inbox.snapshot_for(gateway.persona()).await)))
}

// ============ WhatsApp ============

/// GET /api/v1/whatsapp/inbound
pub async fn whatsapp_inbound(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.whatsapp_inbound().await?))
}

/// GET /api/v1/whatsapp/notifications
pub async fn whatsapp_notifications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.whatsapp_notifications().await?))
}

/// GET /api/v1/whatsapp/unread-count
pub async fn whatsapp_unread_count(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.whatsapp_unread_count().await?))
}

/// POST /api/v1/whatsapp/:id/read
pub async fn whatsapp_mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway()?.whatsapp_mark_read(&id).await?))
}
