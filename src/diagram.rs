//! Configuration handed to the diagram renderer, and cleanup of diagram
//! sources that still carry Org block markers.

use crate::parsing::document::ExportedDocument;
use crate::parsing::dom;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Light,
    Dark,
}

const FONT_FAMILY: &str = r#""Noto Serif CJK SC", "Source Han Serif SC", "PingFang SC", serif"#;

/// Muted ("Morandi") palette for the renderer's base theme
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeVariables {
    pub primary_color: &'static str,
    pub primary_text_color: &'static str,
    pub primary_border_color: &'static str,
    pub line_color: &'static str,
    pub secondary_color: &'static str,
    pub tertiary_color: &'static str,
    pub font_family: &'static str,
    pub font_size: &'static str,
}

impl ThemeVariables {
    pub fn for_scheme(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => Self {
                primary_color: "#e8e4de",
                primary_text_color: "#4a4a4a",
                primary_border_color: "#7a8fa3",
                line_color: "#8b8680",
                secondary_color: "#f0ede8",
                tertiary_color: "#f7f5f0",
                font_family: FONT_FAMILY,
                font_size: "14px",
            },
            ColorScheme::Dark => Self {
                primary_color: "#3a3a3c",
                primary_text_color: "#d4ccc4",
                primary_border_color: "#8a9eb0",
                line_color: "#9a948e",
                secondary_color: "#323234",
                tertiary_color: "#2c2c2e",
                font_family: FONT_FAMILY,
                font_size: "14px",
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlowchartConfig {
    pub use_max_width: bool,
    pub html_labels: bool,
    pub curve: &'static str,
    pub padding: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SequenceConfig {
    pub use_max_width: bool,
    pub diagram_margin_x: u32,
    pub diagram_margin_y: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GanttConfig {
    pub use_max_width: bool,
    pub bar_height: u32,
    pub bar_gap: u32,
}

/// The object passed to the diagram library's `initialize`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagramConfig {
    pub start_on_load: bool,
    pub theme: &'static str,
    pub theme_variables: ThemeVariables,
    pub flowchart: FlowchartConfig,
    pub sequence: SequenceConfig,
    pub gantt: GanttConfig,
}

impl DiagramConfig {
    pub fn for_scheme(scheme: ColorScheme) -> Self {
        Self {
            start_on_load: true,
            theme: "base",
            theme_variables: ThemeVariables::for_scheme(scheme),
            flowchart: FlowchartConfig {
                use_max_width: true,
                html_labels: true,
                curve: "basis",
                padding: 15,
            },
            sequence: SequenceConfig {
                use_max_width: true,
                diagram_margin_x: 50,
                diagram_margin_y: 20,
            },
            gantt: GanttConfig {
                use_max_width: true,
                bar_height: 30,
                bar_gap: 4,
            },
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

static BEGIN_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\+begin_src mermaid.*\n").unwrap());
static END_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\+end_src").unwrap());
static BEGIN_EXPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"#\+begin_export html\n<div class="mermaid">\n"#).unwrap());
static END_EXPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"</div>\n#\+end_export").unwrap());

/// Remove Org source/export block markers left around a diagram definition
pub fn clean_org_markers(source: &str) -> String {
    let cleaned = BEGIN_SRC.replace_all(source, "");
    let cleaned = END_SRC.replace_all(&cleaned, "");
    let cleaned = BEGIN_EXPORT.replace_all(&cleaned, "");
    let cleaned = END_EXPORT.replace_all(&cleaned, "");
    cleaned.trim().to_string()
}

/// Clean every diagram block of `document` that still holds Org markers.
/// Returns how many blocks were rewritten.
pub fn clean_diagram_blocks(document: &ExportedDocument) -> usize {
    let mut cleaned = 0;
    for block in document.diagram_blocks() {
        let mut source = String::new();
        dom::collect_text(&block, &|_| false, &mut source);
        if source.contains("#+begin_src") {
            dom::set_text(&block, &clean_org_markers(&source));
            cleaned += 1;
        }
    }
    cleaned
}
