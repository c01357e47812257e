use tera::{Context, Tera};
use tracing::instrument;

use guia_core::models::page::{Orientation, PageDimensions};
use guia_core::models::request::ExportRequest;

use crate::error::ExportError;
use crate::styles::{PRINT_RULES, PrintLayout, Theme};
use crate::templates;

/// A complete, self-contained HTML page ready to be loaded by the engine.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub html: String,
    pub orientation: Orientation,
    pub dimensions: PageDimensions,
}

/// Wraps caller-supplied markup in the themed page shell.
///
/// Templates are compiled once in [`DocumentAssembler::new`] and reused for
/// every request.
pub struct DocumentAssembler {
    pub(crate) tera: Tera,
    pub(crate) theme: Theme,
    layout: PrintLayout,
}

impl DocumentAssembler {
    pub fn new(theme: Theme, layout: PrintLayout) -> Result<Self, ExportError> {
        Ok(Self {
            tera: templates::compile()?,
            theme,
            layout,
        })
    }

    pub fn layout(&self) -> &PrintLayout {
        &self.layout
    }

    /// Render the full page for `request`.
    ///
    /// `html_content` is inserted verbatim and unescaped into a centered
    /// container sized to the orientation's viewport width.
    #[instrument(skip_all, fields(orientation = %request.orientation))]
    pub fn assemble(&self, request: &ExportRequest) -> Result<AssembledDocument, ExportError> {
        let orientation = request.orientation;
        let dimensions = orientation.dimensions();

        let mut context = Context::new();
        context.insert("title", &self.theme.title);
        context.insert("framework_url", &self.theme.framework_url);
        context.insert(
            "tailwind_config",
            &serde_json::to_string_pretty(&self.theme.tailwind_config())?,
        );
        context.insert("webfont_url", &self.theme.webfont_url);
        context.insert("font_stack", &self.theme.font_stack());
        context.insert("text_color", &self.theme.text_color);
        context.insert("background_color", &self.theme.background_color);
        context.insert("page_rule", &self.layout.page_rule(orientation));
        context.insert("print_rules", PRINT_RULES);
        context.insert("width", &dimensions.width);
        context.insert("html_content", &request.html_content);

        let html = self.tera.render(templates::DOCUMENT, &context)?;
        tracing::debug!(bytes = html.len(), "document assembled");

        Ok(AssembledDocument {
            html,
            orientation,
            dimensions,
        })
    }
}
