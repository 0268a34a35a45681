use crate::handlers::{self, AppState};
use crate::stream_proxy;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Maximum request body (lead uploads are the largest payloads).
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Dashboard API routes, without state or rate limiting.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Persona
        .route(
            "/api/v1/persona",
            get(handlers::get_persona).put(handlers::set_persona),
        )
        // Dashboard
        .route("/api/v1/dashboard/stats", get(handlers::dashboard_stats))
        .route(
            "/api/v1/dashboard/distribution",
            get(handlers::dashboard_distribution),
        )
        // Campaigns
        .route(
            "/api/v1/campaigns",
            get(handlers::list_campaigns).post(handlers::create_campaign),
        )
        .route("/api/v1/campaigns/:id", get(handlers::get_campaign))
        .route("/api/v1/campaigns/:id/stop", post(handlers::stop_campaign))
        .route(
            "/api/v1/campaigns/:id/export",
            get(handlers::export_campaign),
        )
        // Leads
        .route("/api/v1/leads", get(handlers::list_leads))
        .route("/api/v1/leads/events", get(handlers::list_lead_events))
        .route("/api/v1/leads/upload", post(handlers::upload_leads))
        .route("/api/v1/leads/:id/approve", post(handlers::approve_lead))
        .route("/api/v1/leads/:id/reject", post(handlers::reject_lead))
        .route(
            "/api/v1/leads/:id/content",
            patch(handlers::update_lead_content),
        )
        // Replies & inbox
        .route("/api/v1/replies", get(handlers::list_replies))
        .route("/api/v1/replies/:id/read", post(handlers::mark_reply_read))
        .route(
            "/api/v1/messages/status",
            get(handlers::list_message_statuses),
        )
        .route("/api/v1/inbox", get(handlers::inbox_snapshot))
        .route("/api/v1/inbox/refresh", post(handlers::refresh_inbox))
        // WhatsApp
        .route("/api/v1/whatsapp/inbound", get(handlers::whatsapp_inbound))
        .route(
            "/api/v1/whatsapp/notifications",
            get(handlers::whatsapp_notifications),
        )
        .route(
            "/api/v1/whatsapp/unread-count",
            get(handlers::whatsapp_unread_count),
        )
        .route("/api/v1/whatsapp/stream", get(stream_proxy::whatsapp_stream))
        .route(
            "/api/v1/whatsapp/:id/read",
            post(handlers::whatsapp_mark_read),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

/// Final app: health check, the given API routes, tracing and CORS.
pub fn app(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
