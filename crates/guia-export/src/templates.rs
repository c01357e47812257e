use tera::Tera;

use crate::error::ExportError;

pub(crate) const DOCUMENT: &str = "document.html";
pub(crate) const HEADER: &str = "header.html";
pub(crate) const FOOTER: &str = "footer.html";

/// Compile the embedded templates once.
pub(crate) fn compile() -> Result<Tera, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (DOCUMENT, include_str!("../templates/document.html.tera")),
        (HEADER, include_str!("../templates/header.html.tera")),
        (FOOTER, include_str!("../templates/footer.html.tera")),
    ])
    .map_err(|e| ExportError::TemplateParse(e.to_string()))?;
    Ok(tera)
}
