pub mod fixtures {
    pub use crate::session_storage::UnavailableSessionStorage;
    pub use crate::viewport::RecordingViewport;

    /// One entry of a fixture table of contents
    #[derive(Clone, Debug)]
    pub struct TocFixture {
        pub label: String,
        pub anchor: String,
        pub children: Vec<TocFixture>,
    }

    /// A TOC entry linking to a heading with id `anchor`
    pub fn item(label: &str, anchor: &str) -> TocFixture {
        TocFixture {
            label: label.to_string(),
            anchor: anchor.to_string(),
            children: Vec::new(),
        }
    }

    impl TocFixture {
        pub fn with_children(mut self, children: Vec<TocFixture>) -> Self {
            self.children = children;
            self
        }
    }

    fn write_list(items: &[TocFixture], output: &mut String) {
        output.push_str("<ul>\n");
        for item in items {
            output.push_str(&format!(
                "<li><a href=\"#{}\">{}</a>",
                item.anchor, item.label
            ));
            if !item.children.is_empty() {
                output.push('\n');
                write_list(&item.children, output);
            }
            output.push_str("</li>\n");
        }
        output.push_str("</ul>\n");
    }

    fn write_sections(items: &[TocFixture], level: usize, output: &mut String) {
        for item in items {
            let level = level.min(6);
            output.push_str(&format!(
                "<h{level} id=\"{}\">{}</h{level}>\n<p>Body of {}.</p>\n",
                item.anchor, item.label, item.label
            ));
            write_sections(&item.children, level + 1, output);
        }
    }

    /// A page laid out like an Org HTML export: the TOC container followed by
    /// one heading per entry
    pub fn export_document(items: &[TocFixture]) -> String {
        let mut html = String::from(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<title>Fixture</title>\n</head>\n<body>\n\
             <div id=\"content\" class=\"content\">\n<h1 class=\"title\">Fixture</h1>\n\
             <div id=\"table-of-contents\" role=\"doc-toc\">\n<h2>Table of Contents</h2>\n\
             <div id=\"text-table-of-contents\" role=\"doc-toc\">\n",
        );
        write_list(items, &mut html);
        html.push_str("</div>\n</div>\n");
        write_sections(items, 2, &mut html);
        html.push_str("</div>\n</body>\n</html>\n");
        html
    }

    /// `A > [B, C > [D]]`
    pub fn scenario_a_items() -> Vec<TocFixture> {
        vec![item("A", "sec-a").with_children(vec![
            item("B", "sec-b"),
            item("C", "sec-c").with_children(vec![item("D", "sec-d")]),
        ])]
    }

    /// Three top-level sections, the first two with nested subsections
    pub fn manual_items() -> Vec<TocFixture> {
        vec![
            item("1. Introduction", "sec1").with_children(vec![
                item("1.1. Goals", "sec1-1"),
                item("1.2. Layout", "sec1-2").with_children(vec![
                    item("1.2.1. Header", "sec1-2-1"),
                    item("1.2.2. Footer", "sec1-2-2"),
                ]),
            ]),
            item("2. Usage", "sec2").with_children(vec![item("2.1. Install", "sec2-1")]),
            item("3. License", "sec3"),
        ]
    }
}
