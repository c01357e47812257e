//! Repeating header and footer bands.
//!
//! Both are handed to the print engine as native header/footer templates
//! and never appear in the document body, so each page carries exactly one
//! header. The engine renders them in an isolated context: document
//! stylesheets do not apply, so every style is inline.

use tera::Context;

use crate::brand::BrandMark;
use crate::document::DocumentAssembler;
use crate::error::ExportError;
use crate::templates;

/// Header and footer markup for the print engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintBands {
    /// Brand mark followed by the accent bar.
    pub header: String,
    /// "Página N de M", filled in by the engine on each page.
    pub footer: String,
}

impl DocumentAssembler {
    pub fn bands(&self, brand: &BrandMark) -> Result<PrintBands, ExportError> {
        let theme = &self.theme;

        let mut context = Context::new();
        context.insert("font_stack", &theme.font_stack());
        context.insert("text_color", &theme.text_color);
        context.insert("palette", &theme.palette);
        context.insert("wordmark", &theme.wordmark);
        context.insert("side_margin", &self.layout().margins.left);
        context.insert("logo", &brand.data_uri());

        Ok(PrintBands {
            header: self.tera.render(templates::HEADER, &context)?,
            footer: self.tera.render(templates::FOOTER, &context)?,
        })
    }
}
