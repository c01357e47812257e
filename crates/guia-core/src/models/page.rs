use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

/// A4 paper width in inches, as the print engine expects it.
pub const A4_WIDTH_INCHES: f64 = 8.27;

/// A4 paper height in inches.
pub const A4_HEIGHT_INCHES: f64 = 11.69;

const MM_PER_INCH: f64 = 25.4;

/// Page orientation requested by the caller.
///
/// Only `"landscape"` selects landscape. Any other string, `null`, or an
/// absent field falls back to portrait instead of failing the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn is_landscape(self) -> bool {
        matches!(self, Orientation::Landscape)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }

    /// Viewport size for this orientation: A4 at 96 DPI in CSS pixels.
    pub fn dimensions(self) -> PageDimensions {
        match self {
            Orientation::Portrait => PageDimensions {
                width: 794,
                height: 1123,
            },
            Orientation::Landscape => PageDimensions {
                width: 1123,
                height: 794,
            },
        }
    }
}

impl From<&str> for Orientation {
    fn from(value: &str) -> Self {
        if value == "landscape" {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Orientation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Orientation::from).unwrap_or_default())
    }
}

/// Logical pixel dimensions used to size the browser viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    /// The top margin leaves room for the repeating header band.
    fn default() -> Self {
        Self {
            top: 28.0,
            right: 12.0,
            bottom: 18.0,
            left: 12.0,
        }
    }
}

impl Margins {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Result<Self, CoreError> {
        for (side, value) in [("top", top), ("right", right), ("bottom", bottom), ("left", left)] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidMargin(format!("{side} = {value}")));
            }
        }
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    pub fn top_inches(&self) -> f64 {
        self.top / MM_PER_INCH
    }

    pub fn right_inches(&self) -> f64 {
        self.right / MM_PER_INCH
    }

    pub fn bottom_inches(&self) -> f64 {
        self.bottom / MM_PER_INCH
    }

    pub fn left_inches(&self) -> f64 {
        self.left / MM_PER_INCH
    }

    /// CSS `margin` shorthand, e.g. `28mm 12mm 18mm 12mm`.
    pub fn css(&self) -> String {
        format!(
            "{}mm {}mm {}mm {}mm",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// Parses CSS-style shorthand in millimetres: one, two, three or four
/// whitespace- or comma-separated values.
impl FromStr for Margins {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.trim_end_matches("mm")
                    .parse::<f64>()
                    .map_err(|_| CoreError::InvalidMargin(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match values.as_slice() {
            [all] => Margins::new(*all, *all, *all, *all),
            [vertical, horizontal] => {
                Margins::new(*vertical, *horizontal, *vertical, *horizontal)
            }
            [top, horizontal, bottom] => Margins::new(*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => Margins::new(*top, *right, *bottom, *left),
            _ => Err(CoreError::InvalidMargin(s.to_string())),
        }
    }
}
