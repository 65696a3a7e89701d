use std::sync::Arc;

use crate::builder::session::SessionStore;
use crate::config::Config;
use crate::export::Exporter;
use crate::templates::TemplateRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Template id → layout function. Built once at startup, read-only afterwards.
    pub templates: Arc<TemplateRegistry>,
    /// Holds the pluggable `Arc<dyn Rasterizer>`; tests build it with a stub.
    pub exporter: Exporter,
}

impl AppState {
    pub fn new(config: Config, exporter: Exporter) -> Self {
        Self {
            sessions: SessionStore::new(config.max_sessions).with_idle_ttl(config.session_ttl()),
            templates: Arc::new(TemplateRegistry::builtin()),
            config,
            exporter,
        }
    }
}
