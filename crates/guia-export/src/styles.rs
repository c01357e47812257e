use guia_core::models::page::{Margins, Orientation};
use serde::{Deserialize, Serialize};

/// Print pagination rules injected into every document.
///
/// Cards, tables, images and figures are never split across pages,
/// headings stay attached to the content that follows, and paragraphs keep
/// at least three lines on either side of a page break.
pub const PRINT_RULES: &str = include_str!("../templates/print.css");

/// The `cf` colour palette exposed to Tailwind as `cf-green`, `cf-blue`, …
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandPalette {
    pub green: String,
    pub blue: String,
    pub celeste: String,
    pub yellow: String,
    pub red: String,
    pub gray: String,
}

impl Default for BrandPalette {
    fn default() -> Self {
        Self {
            green: "#4cbf8c".to_string(),
            blue: "#005fc5".to_string(),
            celeste: "#eef3fe".to_string(),
            yellow: "#ffc000".to_string(),
            red: "#ff6b75".to_string(),
            gray: "#4e526e".to_string(),
        }
    }
}

/// Visual theme of the exported guide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    /// Primary font family (e.g. "Montserrat").
    pub font_family: String,

    /// Fallback generic family appended after `font_family`.
    pub font_fallback: String,

    /// Body text colour.
    pub text_color: String,

    pub background_color: String,

    pub palette: BrandPalette,

    /// Stylesheet URL for the webfont.
    pub webfont_url: String,

    /// Script URL of the utility-first CSS framework.
    pub framework_url: String,

    /// Page `<title>`.
    pub title: String,

    /// Text shown in the header band when no logo is available.
    pub wordmark: String,
}

impl Default for Theme {
    fn default() -> Self {
        let palette = BrandPalette::default();
        Self {
            font_family: "Montserrat".to_string(),
            font_fallback: "sans-serif".to_string(),
            text_color: palette.gray.clone(),
            background_color: "#ffffff".to_string(),
            palette,
            webfont_url: "https://fonts.googleapis.com/css2?family=Montserrat:wght@400;500;600;700&display=swap".to_string(),
            framework_url: "https://cdn.tailwindcss.com?plugins=typography".to_string(),
            title: "Guía Generada - ComunidadFeliz".to_string(),
            wordmark: "ComunidadFeliz".to_string(),
        }
    }
}

impl Theme {
    /// The `tailwind.config` theme extension as a JSON object literal.
    pub fn tailwind_config(&self) -> serde_json::Value {
        serde_json::json!({
            "theme": {
                "extend": {
                    "fontFamily": {
                        "sans": [self.font_family, self.font_fallback],
                    },
                    "colors": {
                        "cf": self.palette,
                    },
                },
            },
        })
    }

    /// CSS `font-family` value, e.g. `'Montserrat', sans-serif`.
    pub fn font_stack(&self) -> String {
        format!("'{}', {}", self.font_family, self.font_fallback)
    }
}

/// Page geometry and print-engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintLayout {
    pub margins: Margins,

    /// Print scale factor passed to the engine.
    pub scale: f64,

    pub print_background: bool,

    /// Let the document's `@page` rule decide the paper size.
    pub prefer_css_page_size: bool,
}

impl Default for PrintLayout {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            scale: 0.9,
            print_background: true,
            prefer_css_page_size: true,
        }
    }
}

impl PrintLayout {
    /// The `@page` rule declaring A4 paper in the requested orientation.
    ///
    /// The orientation keyword is required: with `prefer_css_page_size` a
    /// bare `size: A4` would override the engine's landscape flag.
    pub fn page_rule(&self, orientation: Orientation) -> String {
        format!(
            "@page {{ size: A4 {}; margin: {}; }}",
            orientation.as_str(),
            self.margins.css()
        )
    }
}
