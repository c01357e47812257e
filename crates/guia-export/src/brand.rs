//! Branding asset shown in the repeating header band.
//!
//! The logo is read once at process start and shared read-only by every
//! request. A missing or unreadable file is not an error: the header falls
//! back to a text wordmark.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// What the header band displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandMark {
    /// Base64-encoded image with its mime type.
    Logo { mime: &'static str, data: String },
    /// No logo available; render the theme wordmark as text.
    Wordmark,
}

impl BrandMark {
    /// Load the logo at `path`, degrading to [`BrandMark::Wordmark`].
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => {
                let mime = mime_for(path);
                tracing::info!(path = %path.display(), bytes = bytes.len(), mime, "loaded brand logo");
                BrandMark::Logo {
                    mime,
                    data: STANDARD.encode(bytes),
                }
            }
            Ok(_) => {
                tracing::warn!(path = %path.display(), "brand logo is empty, using text wordmark");
                BrandMark::Wordmark
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "brand logo not available, using text wordmark");
                BrandMark::Wordmark
            }
        }
    }

    /// `data:` URI for the logo, or `None` for the wordmark.
    pub fn data_uri(&self) -> Option<String> {
        match self {
            BrandMark::Logo { mime, data } => Some(format!("data:{mime};base64,{data}")),
            BrandMark::Wordmark => None,
        }
    }

    pub fn is_logo(&self) -> bool {
        matches!(self, BrandMark::Logo { .. })
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("logo.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("logo.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("assets/logo.svg")), "image/svg+xml");
        assert_eq!(mime_for(Path::new("logo")), "image/png");
    }
}
