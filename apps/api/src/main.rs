mod builder;
mod config;
mod errors;
mod export;
mod extract;
mod models;
mod routes;
mod state;
mod templates;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::{Exporter, FontLibrary, GlyphRasterizer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    // Fonts for PDF export. A missing directory leaves export unavailable, not the server.
    let fonts = match FontLibrary::load_dir(&config.font_dir) {
        Ok(fonts) => fonts,
        Err(e) => {
            warn!(
                "Font directory {} unreadable ({e}); exports will fail until fonts are added",
                config.font_dir.display()
            );
            FontLibrary::empty()
        }
    };
    if fonts.is_empty() {
        warn!("No fonts loaded; PDF export is disabled");
    } else {
        info!("Fonts: {}", fonts.names().collect::<Vec<_>>().join(", "));
    }

    let rasterizer = Arc::new(GlyphRasterizer::new(Arc::new(fonts)));
    let settings = config.export_settings();
    info!(
        "Export: {:?} page, preview {}px at {}x",
        settings.page, settings.preview_width_px, settings.scale
    );
    let exporter = Exporter::new(rasterizer, settings);

    // Build app state
    let state = AppState::new(config.clone(), exporter);
    info!(
        "Sessions: up to {}, evicted after {}s idle",
        config.max_sessions, config.session_ttl_secs
    );
    let _sweeper = state.sessions.spawn_sweeper(config.sweep_interval());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
