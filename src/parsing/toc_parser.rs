use super::dom;
use crate::config::TocConfig;
use crate::widget::table_of_contents::tree::{TocNode, TocTree};
use markup5ever_rcdom::Handle;

pub struct TocParser;

impl TocParser {
    /// Strip the leading `#` of an in-page href; other hrefs have no anchor
    fn anchor_from_href(href: &str) -> Option<String> {
        href.strip_prefix('#')
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string)
    }

    /// Glyphs and hints a previous decoration left in the markup
    fn is_widget_chrome(node: &Handle) -> bool {
        ["toc-fold", "toc-toggle-icon", "toc-hint"]
            .iter()
            .any(|class| dom::has_class(node, class))
    }

    /// Locate the list root inside `container` and derive the tree from it.
    /// Returns `None` when the container holds no list.
    pub fn parse_container(container: &Handle, config: &TocConfig) -> Option<TocTree> {
        let title_node = dom::find_descendant_skipping(
            container,
            &|node| dom::is_element(node, "h2"),
            &dom::is_list,
        );
        let title = title_node
            .map(|node| dom::normalized_text(&node, &Self::is_widget_chrome))
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| config.labels.default_title.clone());

        let content_id = config.content_id.as_str();
        let content = dom::find_descendant(container, &|node| {
            dom::attr(node, "id").as_deref() == Some(content_id)
        });
        let list_root = content
            .as_ref()
            .and_then(|content| dom::find_descendant(content, &dom::is_list))
            .or_else(|| dom::find_descendant(container, &dom::is_list))?;

        let roots = Self::convert_list(&list_root, 0);
        Some(TocTree::new(title, roots))
    }

    /// Convert the `li` children of a list into nodes at `depth`
    fn convert_list(list: &Handle, depth: usize) -> Vec<TocNode> {
        dom::element_children(list)
            .iter()
            .filter(|child| dom::is_element(child, "li"))
            .map(|item| Self::convert_item(item, depth))
            .collect()
    }

    fn convert_item(item: &Handle, depth: usize) -> TocNode {
        let link =
            dom::find_descendant_skipping(item, &|node| dom::is_element(node, "a"), &dom::is_list);
        let anchor = link
            .as_ref()
            .and_then(|link| dom::attr(link, "href"))
            .and_then(|href| Self::anchor_from_href(&href));
        let label = match &link {
            Some(link) => dom::normalized_text(link, &|_| false),
            None => dom::normalized_text(item, &|node| {
                dom::is_list(node) || Self::is_widget_chrome(node)
            }),
        };

        let sublist = dom::element_children(item)
            .into_iter()
            .find(|child| dom::is_list(child));

        match sublist {
            Some(sublist) => {
                let children = Self::convert_list(&sublist, depth + 1);
                TocNode::branch(label, anchor, depth, children)
            }
            None => TocNode::leaf(label, anchor, depth),
        }
    }
}
