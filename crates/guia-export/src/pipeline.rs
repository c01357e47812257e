use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use guia_core::models::document::RenderedDocument;
use guia_core::models::request::ExportRequest;

use crate::bands::PrintBands;
use crate::brand::BrandMark;
use crate::document::DocumentAssembler;
use crate::error::ExportError;
use crate::pdf::{PdfEngine, RenderJob};

/// Assemble → render → package, all or nothing.
///
/// Built once at startup and shared by every request; it holds no mutable
/// state.
pub struct Pipeline {
    assembler: DocumentAssembler,
    engine: Arc<dyn PdfEngine>,
    bands: PrintBands,
    deadline: Duration,
}

impl Pipeline {
    /// The header and footer only depend on the brand mark, so they are
    /// rendered here rather than per request.
    pub fn new(
        assembler: DocumentAssembler,
        engine: Arc<dyn PdfEngine>,
        brand: &BrandMark,
        deadline: Duration,
    ) -> Result<Self, ExportError> {
        let bands = assembler.bands(brand)?;
        Ok(Self {
            assembler,
            engine,
            bands,
            deadline,
        })
    }

    pub fn bands(&self) -> &PrintBands {
        &self.bands
    }

    #[instrument(skip_all, fields(orientation = %request.orientation, html_len = request.html_content.len()))]
    pub async fn export(&self, request: &ExportRequest) -> Result<RenderedDocument, ExportError> {
        let document = self.assembler.assemble(request)?;

        let job = RenderJob {
            html: document.html,
            orientation: document.orientation,
            dimensions: document.dimensions,
            bands: self.bands.clone(),
            layout: *self.assembler.layout(),
        };

        let bytes = tokio::time::timeout(self.deadline, self.engine.render(job))
            .await
            .map_err(|_| ExportError::Timeout(self.deadline))??;

        tracing::info!(bytes = bytes.len(), "export rendered");
        Ok(RenderedDocument::pdf(bytes))
    }
}
