use thiserror::Error;

/// Why an export produced no file. No partial file is ever returned alongside these.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("the preview is not rendered yet; reach the preview step before exporting")]
    PreviewNotReady,

    #[error("an export for this session is already in progress")]
    InProgress,

    #[error("no usable font for family '{0}'")]
    FontUnavailable(String),

    #[error("rasterization failed: {0}")]
    Raster(String),

    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    #[error("export worker failed: {0}")]
    Worker(String),
}

impl ExportError {
    /// Whether the caller caused the failure (wrong moment) rather than the pipeline.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ExportError::PreviewNotReady | ExportError::InProgress)
    }
}
