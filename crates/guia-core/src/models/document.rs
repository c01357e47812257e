/// Content type of every successful export.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Attachment filename suggested to the client.
pub const EXPORT_FILENAME: &str = "guia-comunidadfeliz.pdf";

/// A finished PDF. Produced per request and never cached.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub filename: &'static str,
    pub content_type: &'static str,
}

impl RenderedDocument {
    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            filename: EXPORT_FILENAME,
            content_type: PDF_CONTENT_TYPE,
        }
    }

    /// Value for the `Content-Disposition` response header.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
