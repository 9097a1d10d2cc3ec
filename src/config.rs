use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_STORAGE_KEY: &str = "org-toc-state";

/// Root margin of the active-section observer: a strip starting 20% below
/// the viewport top and ending 80% above the viewport bottom.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct IntersectionBand {
    pub top_margin_percent: f64,
    pub bottom_margin_percent: f64,
}

impl Default for IntersectionBand {
    fn default() -> Self {
        Self {
            top_margin_percent: -20.0,
            bottom_margin_percent: -80.0,
        }
    }
}

impl IntersectionBand {
    /// CSS form of the margin, as handed to an intersection observer
    pub fn root_margin(&self) -> String {
        format!(
            "{}% 0px {}% 0px",
            self.top_margin_percent, self.bottom_margin_percent
        )
    }

    /// Vertical extent of the band inside a viewport of the given height
    pub fn bounds(&self, viewport_height: f64) -> (f64, f64) {
        let top = -self.top_margin_percent / 100.0 * viewport_height;
        let bottom = viewport_height + self.bottom_margin_percent / 100.0 * viewport_height;
        (top, bottom.max(top))
    }

    /// Whether an element spanning `rect_top..rect_bottom` (viewport
    /// coordinates) touches the band
    pub fn intersects(&self, rect_top: f64, rect_bottom: f64, viewport_height: f64) -> bool {
        let (band_top, band_bottom) = self.bounds(viewport_height);
        rect_top <= band_bottom && rect_bottom >= band_top
    }
}

/// Visible strings of the widget
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TocLabels {
    pub default_title: String,
    pub expand_all: String,
    pub collapse_all: String,
    pub expand: String,
    pub collapse: String,
    pub expanded_glyph: String,
    pub collapsed_glyph: String,
    pub hint_expanded: String,
    pub hint_collapsed: String,
    pub title_tooltip: String,
}

impl Default for TocLabels {
    fn default() -> Self {
        Self {
            default_title: "Table of Contents".to_string(),
            expand_all: "Expand all".to_string(),
            collapse_all: "Collapse all".to_string(),
            expand: "Expand".to_string(),
            collapse: "Collapse".to_string(),
            expanded_glyph: "▼".to_string(),
            collapsed_glyph: "▶".to_string(),
            hint_expanded: " [collapse]".to_string(),
            hint_collapsed: " [expand]".to_string(),
            title_tooltip: "Click to collapse or expand the table of contents".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TocConfig {
    /// Id of the element wrapping the whole TOC
    pub container_id: String,
    /// Id of the element holding the list inside the container
    pub content_id: String,
    pub storage_key: String,
    /// Distance kept between a scroll target and the viewport top
    pub header_clearance: f64,
    pub band: IntersectionBand,
    pub labels: TocLabels,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            container_id: "table-of-contents".to_string(),
            content_id: "text-table-of-contents".to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            header_clearance: 100.0,
            band: IntersectionBand::default(),
            labels: TocLabels::default(),
        }
    }
}

impl TocConfig {
    pub fn load_or_default(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load config from {path}: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let path = Path::new(file_path);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        match serde_json::from_str::<Self>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                log::error!("Failed to parse config file: {e}");
                Err(anyhow::anyhow!("Failed to parse config: {}", e))
            }
        }
    }
}
