//! Lead Dashboard API Library
//!
//! Backend-for-frontend of the lead-generation dashboard: proxies the
//! outreach backend (campaigns, leads, replies, WhatsApp events) and ranks
//! leads for the dashboard's search box.
//!
//! # Modules
//!
//! - `api`: API-layer namespace (handlers, routes, stream proxy).
//! - `core`: Domain-layer namespace (models, search, errors).
//! - `integrations`: External service integrations.
//! - `backend_models`: Backend payload shapes and the lead adapter.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `gateway_client`: Persona-scoped backend gateways.
//! - `handlers`: HTTP request handlers.
//! - `inbox`: Periodic reply/status refresh.
//! - `lead_board`: In-memory lead list of a session.
//! - `models`: Core data models.
//! - `persona`: Process-wide persona preference.
//! - `position`: Job-title classification.
//! - `routes`: Router construction.
//! - `search`: Relevance scoring and the filter-and-rank pipeline.
//! - `stream_proxy`: Server-sent-event passthrough.

pub mod api;
pub mod core;
pub mod integrations;

pub mod backend_models;
pub mod config;
pub mod errors;
pub mod gateway_client;
pub mod handlers;
pub mod inbox;
pub mod lead_board;
pub mod models;
pub mod persona;
pub mod position;
pub mod routes;
pub mod search;
pub mod stream_proxy;
