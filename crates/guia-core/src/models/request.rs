use serde::{Deserialize, Serialize};

use super::page::Orientation;

/// Body of `POST /export`.
///
/// `html_content` is a markup fragment that is placed verbatim inside the
/// page shell. It is not sanitized: callers are trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub html_content: String,
    #[serde(default)]
    pub orientation: Orientation,
}

impl ExportRequest {
    pub fn new(html_content: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            html_content: html_content.into(),
            orientation,
        }
    }
}
