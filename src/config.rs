//! Export options.
//!
//! Everything is optional in JSON; missing fields take their defaults.
//!
//! ```json
//! { "font": "serif", "page": { "margin": 20 }, "author": "Ada" }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{FontPreference, PageGeometry};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub font: FontPreference,
    pub page: PageGeometry,
    /// Written to the PDF Info dictionary when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl ExportOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_font(mut self, font: FontPreference) -> Self {
        self.font = font;
        self
    }
}
