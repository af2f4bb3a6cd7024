//! Display names for sky symbols
//!
//! Rendering is presentation only. The CLI picks a renderer and hands it to
//! the report formatter; aggregation never looks at it.

use crate::data::SkySymbol;

/// MET Norway weather icon service, legacy numeric symbols
pub const METNO_ICON_URL: &str = "https://api.met.no/weatherapi/weathericon/1.1/";

/// Turns a sky symbol into something displayable (URL, file name, ...)
pub trait SymbolRenderer {
    fn render(&self, symbol: &SkySymbol, night: bool) -> String;
}

/// PNG icon URLs from the MET Norway icon service
#[derive(Debug, Clone, Default)]
pub struct MetnoIcons;

impl SymbolRenderer for MetnoIcons {
    fn render(&self, symbol: &SkySymbol, night: bool) -> String {
        let mut url = format!(
            "{}?symbol={};content_type=image/png",
            METNO_ICON_URL, symbol.number
        );
        if night {
            url.push_str(";is_night=1");
        }
        url
    }
}

/// Local icon file names such as "3-partlycloudy.svg"
#[derive(Debug, Clone)]
pub struct FileIcons {
    extension: String,
}

impl FileIcons {
    /// `extension` without the leading dot; empty means no extension
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl SymbolRenderer for FileIcons {
    fn render(&self, symbol: &SkySymbol, _night: bool) -> String {
        let name = symbol.name.to_lowercase();
        if self.extension.is_empty() {
            format!("{}-{}", symbol.number, name)
        } else {
            format!("{}-{}.{}", symbol.number, name, self.extension)
        }
    }
}
