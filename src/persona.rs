//! Process-wide persona preference.
//!
//! One store is created at startup and shared through `AppState`. Subscribers
//! hold a `watch::Receiver` and observe a new value as soon as `set` returns.

use crate::errors::AppError;
use crate::models::{Persona, PersonaBody};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

#[derive(Debug)]
pub struct PersonaStore {
    sender: watch::Sender<Persona>,
    state_path: Option<PathBuf>,
}

impl PersonaStore {
    /// Creates the store. A persisted persona at `state_path` wins over
    /// `default`; an unreadable or malformed file falls back to `default`.
    pub fn new(default: Persona, state_path: Option<PathBuf>) -> Self {
        let initial = state_path
            .as_deref()
            .and_then(load_persisted)
            .unwrap_or(default);
        tracing::info!("Persona store initialized: {}", initial);

        let (sender, _) = watch::channel(initial);
        Self { sender, state_path }
    }

    /// Current persona.
    pub fn get(&self) -> Persona {
        *self.sender.borrow()
    }

    /// Switches the persona, persisting it first when a state path is set.
    /// Returns the previous persona.
    pub fn set(&self, persona: Persona) -> Result<Persona, AppError> {
        if let Some(ref path) = self.state_path {
            persist(path, persona)?;
        }

        let previous = self.sender.send_replace(persona);
        if previous != persona {
            tracing::info!("Persona switched: {} -> {}", previous, persona);
        }
        Ok(previous)
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<Persona> {
        self.sender.subscribe()
    }
}

fn load_persisted(path: &Path) -> Option<Persona> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<PersonaBody>(&raw) {
        Ok(body) => Some(body.persona),
        Err(e) => {
            tracing::warn!("Ignoring persona state at {}: {}", path.display(), e);
            None
        }
    }
}

fn persist(path: &Path, persona: Persona) -> Result<(), AppError> {
    let body = serde_json::to_string(&PersonaBody { persona })
        .map_err(|e| AppError::InternalError(format!("Failed to serialize persona: {}", e)))?;
    std::fs::write(path, body).map_err(|e| {
        AppError::InternalError(format!(
            "Failed to persist persona to {}: {}",
            path.display(),
            e
        ))
    })
}
