use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::export::{ExportSettings, PageSize};
use crate::templates::Theme;

/// DejaVu Sans regular and bold ship with the crate.
const BUNDLED_FONT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fonts");

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub font_dir: PathBuf,
    pub raster_scale: f32,
    pub preview_width_px: f32,
    pub page_size: PageSize,
    pub default_theme: Theme,
    pub max_sessions: usize,
    /// Sessions untouched for this many seconds are evicted.
    pub session_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            font_dir: PathBuf::from(BUNDLED_FONT_DIR),
            raster_scale: 2.0,
            preview_width_px: 794.0,
            page_size: PageSize::A4,
            default_theme: Theme::Light,
            max_sessions: 1000,
            session_ttl_secs: 3600,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let raster_scale: f32 = parse_or(&lookup, "RESUME_RASTER_SCALE", defaults.raster_scale)?;
        if !(raster_scale > 0.0 && raster_scale <= 8.0) {
            return Err(anyhow!("RESUME_RASTER_SCALE must be in (0, 8], got {raster_scale}"));
        }
        let preview_width_px: f32 =
            parse_or(&lookup, "RESUME_PREVIEW_WIDTH_PX", defaults.preview_width_px)?;
        if preview_width_px < 1.0 {
            return Err(anyhow!("RESUME_PREVIEW_WIDTH_PX must be positive"));
        }
        let session_ttl_secs: u64 =
            parse_or(&lookup, "RESUME_SESSION_TTL_SECS", defaults.session_ttl_secs)?;
        if session_ttl_secs == 0 {
            return Err(anyhow!("RESUME_SESSION_TTL_SECS must be positive"));
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", defaults.port)
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            font_dir: lookup("RESUME_FONT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.font_dir),
            raster_scale,
            preview_width_px,
            page_size: parse_or(&lookup, "RESUME_PAGE_SIZE", defaults.page_size)?,
            default_theme: parse_or(&lookup, "RESUME_DEFAULT_THEME", defaults.default_theme)?,
            max_sessions: parse_or(&lookup, "RESUME_MAX_SESSIONS", defaults.max_sessions)?,
            session_ttl_secs,
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// How often the idle sweep runs: a quarter of the TTL, at most once a minute.
    pub fn sweep_interval(&self) -> Duration {
        (self.session_ttl() / 4).clamp(Duration::from_secs(1), Duration::from_secs(60))
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            preview_width_px: self.preview_width_px,
            scale: self.raster_scale,
            page: self.page_size,
            theme: Theme::Light,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{key}='{raw}' is invalid: {e}")),
    }
}
