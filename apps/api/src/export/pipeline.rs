//! Export orchestration: rendered preview → bitmap → one-page PDF → named file.
//!
//! The CPU-heavy part runs on a blocking worker. The session is flagged as exporting
//! for the duration, so a second export on the same session is refused until the
//! first settles, whether it succeeds or fails.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::builder::session::SessionStore;
use crate::errors::AppError;
use crate::export::error::ExportError;
use crate::export::pdf::{embed_image, PageSize};
use crate::export::raster::Rasterizer;
use crate::templates::{RenderedPreview, TemplateRegistry, Theme};

const FALLBACK_NAME: &str = "resume";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSettings {
    /// On-screen preview width in CSS pixels.
    pub preview_width_px: f32,
    /// Raster multiplier over the preview width.
    pub scale: f32,
    pub page: PageSize,
    /// Exports are printed documents, so they normally use the light theme.
    pub theme: Theme,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            preview_width_px: 794.0,
            scale: 2.0,
            page: PageSize::A4,
            theme: Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct Exporter {
    rasterizer: Arc<dyn Rasterizer>,
    settings: ExportSettings,
}

impl Exporter {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, settings: ExportSettings) -> Self {
        Self {
            rasterizer,
            settings,
        }
    }

    /// Blocking: rasterizes `preview` and embeds it in a PDF named after `person_name`.
    pub fn export(
        &self,
        preview: &RenderedPreview,
        person_name: &str,
    ) -> Result<ExportedFile, ExportError> {
        let image = self.rasterizer.rasterize(
            preview,
            self.settings.preview_width_px,
            self.settings.scale,
        )?;
        let title = match person_name.trim() {
            "" => "Resume",
            name => name,
        };
        let bytes = embed_image(&image, self.settings.page, title)?;
        Ok(ExportedFile {
            file_name: export_file_name(person_name),
            bytes: Bytes::from(bytes),
        })
    }
}

/// `{name}.pdf`, or `resume.pdf` when the name is blank. Characters that would break a
/// path or a `Content-Disposition` header are dropped.
pub fn export_file_name(person_name: &str) -> String {
    let cleaned: String = person_name
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|'))
        .collect();
    let stem = match cleaned.trim() {
        "" => FALLBACK_NAME,
        stem => stem,
    };
    format!("{stem}.pdf")
}

/// `attachment` disposition with an ASCII `filename` and an RFC 5987 `filename*` for
/// names outside ASCII.
pub fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect();
    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

/// Runs a full export for session `id`.
///
/// Refuses while the session is not on the preview step or already exporting.
/// The exporting flag is always cleared before returning.
pub async fn export_session(
    sessions: &SessionStore,
    registry: &TemplateRegistry,
    exporter: &Exporter,
    id: Uuid,
) -> Result<ExportedFile, AppError> {
    let theme = exporter.settings.theme;
    let (preview, person_name) = sessions
        .update(id, |wizard| {
            if !wizard.preview_ready() {
                return Err(ExportError::PreviewNotReady);
            }
            if !wizard.try_begin_export() {
                return Err(ExportError::InProgress);
            }
            Ok((
                wizard.render(registry, theme),
                wizard.document().personal.name.clone(),
            ))
        })
        .await??;

    let worker = exporter.clone();
    let result = tokio::task::spawn_blocking(move || worker.export(&preview, &person_name))
        .await
        .unwrap_or_else(|e| Err(ExportError::Worker(e.to_string())));

    let succeeded = result.is_ok();
    if let Err(e) = sessions
        .update(id, |wizard| wizard.finish_export(succeeded))
        .await
    {
        warn!("Session {id} vanished during export: {e}");
    }

    let file = result?;
    info!(
        "Exported session {id} as {} ({} bytes)",
        file.file_name,
        file.bytes.len()
    );
    Ok(file)
}
