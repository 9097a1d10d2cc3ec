use super::dom;
use crate::config::TocConfig;
use anyhow::{Context, Result};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, RcDom};

/// An exported HTML document held as a mutable DOM
pub struct ExportedDocument {
    dom: RcDom,
}

impl ExportedDocument {
    pub fn parse(html: &str) -> Result<Self> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .context("Failed to parse exported HTML")?;

        Ok(Self { dom })
    }

    pub fn root(&self) -> &Handle {
        &self.dom.document
    }

    /// The element wrapping the table of contents: by id first, then by class
    pub fn find_toc_container(&self, config: &TocConfig) -> Option<Handle> {
        let container_id = config.container_id.as_str();
        dom::find_descendant(self.root(), &|node| {
            dom::attr(node, "id").as_deref() == Some(container_id)
        })
        .or_else(|| {
            dom::find_descendant(self.root(), &|node| {
                dom::has_class(node, container_id) || dom::has_class(node, "toc")
            })
        })
    }

    /// Ids of every heading that can be navigated to, in document order
    pub fn heading_ids(&self) -> Vec<String> {
        let mut headings = Vec::new();
        dom::collect_descendants(self.root(), &dom::is_heading, &mut headings);
        headings
            .iter()
            .filter_map(|heading| dom::attr(heading, "id"))
            .filter(|id| !id.is_empty())
            .collect()
    }

    /// Elements carrying the `mermaid` class
    pub fn diagram_blocks(&self) -> Vec<Handle> {
        let mut blocks = Vec::new();
        dom::collect_descendants(
            self.root(),
            &|node| dom::has_class(node, "mermaid"),
            &mut blocks,
        );
        blocks
    }

    pub fn to_html(&self) -> Result<String> {
        dom::inner_html(self.root())
    }
}
