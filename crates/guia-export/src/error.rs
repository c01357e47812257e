use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    #[error("template parse error: {0}")]
    TemplateParse(String),

    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("page navigation failed: {0}")]
    Navigation(String),

    #[error("network did not settle within {0:?}")]
    Settle(Duration),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("rendering exceeded the {0:?} deadline")]
    Timeout(Duration),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tera::Error> for ExportError {
    fn from(e: tera::Error) -> Self {
        ExportError::TemplateRender(e.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::TemplateRender(e.to_string())
    }
}
