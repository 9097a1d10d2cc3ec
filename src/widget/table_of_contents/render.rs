use super::TocController;
use super::tree::{Fold, TocNode};
use crate::parsing::dom::{element, inner_html, outer_html, text, with_children};
use markup5ever_rcdom::Handle;

/// Build the widget: a header with title, toggle icon, hint and bulk
/// actions, followed by the content region holding the tree.
pub fn render_widget(controller: &TocController) -> Vec<Handle> {
    vec![render_header(controller), render_content(controller)]
}

/// The widget serialized as HTML
pub fn widget_html(controller: &TocController) -> anyhow::Result<String> {
    let wrapper = with_children(element("div", &[]), render_widget(controller));
    inner_html(&wrapper)
}

fn render_header(controller: &TocController) -> Handle {
    let labels = &controller.config().labels;
    let collapsed = controller.is_tree_collapsed();

    let icon_class = if collapsed {
        "toc-toggle-icon toc-toggle-icon-collapsed"
    } else {
        "toc-toggle-icon"
    };
    let hint = if collapsed {
        &labels.hint_collapsed
    } else {
        &labels.hint_expanded
    };
    let aria_expanded = if collapsed { "false" } else { "true" };

    let title = with_children(
        element(
            "h2",
            &[
                ("class", "toc-title"),
                ("title", labels.title_tooltip.as_str()),
                ("role", "button"),
                ("tabindex", "0"),
                ("aria-expanded", aria_expanded),
            ],
        ),
        vec![
            with_children(
                element("span", &[("class", icon_class), ("aria-hidden", "true")]),
                vec![text(&labels.expanded_glyph)],
            ),
            text(&controller.tree().title),
            with_children(
                element("span", &[("class", "toc-hint")]),
                vec![text(hint)],
            ),
        ],
    );

    let actions = with_children(
        element("div", &[("class", "toc-actions")]),
        vec![
            with_children(
                element("button", &[("type", "button"), ("class", "toc-expand-all")]),
                vec![text(&labels.expand_all)],
            ),
            with_children(
                element("button", &[("type", "button"), ("class", "toc-collapse-all")]),
                vec![text(&labels.collapse_all)],
            ),
        ],
    );

    with_children(
        element("div", &[("class", "toc-header")]),
        vec![title, actions],
    )
}

fn render_content(controller: &TocController) -> Handle {
    let content_id = controller.config().content_id.as_str();
    let content = if controller.is_tree_collapsed() {
        element(
            "div",
            &[
                ("id", content_id),
                ("class", "toc-content toc-collapsed"),
                ("hidden", "hidden"),
            ],
        )
    } else {
        element("div", &[("id", content_id), ("class", "toc-content")])
    };

    let mut counters = Counters::default();
    let list = render_list(
        controller,
        controller.tree().roots(),
        element("ul", &[("class", "toc-tree")]),
        &mut counters,
    );
    with_children(content, vec![list])
}

/// Pre-order positions handed out while walking the tree
#[derive(Default)]
struct Counters {
    link: usize,
    fold: usize,
}

fn render_list(
    controller: &TocController,
    nodes: &[TocNode],
    list: Handle,
    counters: &mut Counters,
) -> Handle {
    let items = nodes
        .iter()
        .map(|node| render_item(controller, node, counters))
        .collect();
    with_children(list, items)
}

fn render_item(controller: &TocController, node: &TocNode, counters: &mut Counters) -> Handle {
    let link_index = counters.link;
    counters.link += 1;
    let is_active = controller.active_link() == Some(link_index);

    let mut parts = Vec::new();
    let item_class = match node {
        TocNode::Leaf { .. } => {
            parts.push(element(
                "span",
                &[
                    ("class", "toc-fold toc-fold-placeholder"),
                    ("aria-hidden", "true"),
                ],
            ));
            parts.push(render_label(node, is_active));
            "toc-item toc-leaf"
        }
        TocNode::Branch { children, fold, .. } => {
            let fold_index = counters.fold;
            counters.fold += 1;

            parts.push(render_fold_control(controller, fold_index, *fold));
            parts.push(render_label(node, is_active));

            let sublist = if fold.is_collapsed() {
                element(
                    "ul",
                    &[("class", "toc-sublist toc-collapsed"), ("hidden", "hidden")],
                )
            } else {
                element("ul", &[("class", "toc-sublist")])
            };
            parts.push(render_list(controller, children, sublist, counters));
            "toc-item toc-branch"
        }
    };

    with_children(element("li", &[("class", item_class)]), parts)
}

fn render_fold_control(controller: &TocController, fold_index: usize, fold: Fold) -> Handle {
    let (glyph, label) = controller.indicator(fold);
    let index = fold_index.to_string();
    let aria_expanded = if fold.is_collapsed() { "false" } else { "true" };

    with_children(
        element(
            "span",
            &[
                ("class", "toc-fold"),
                ("role", "button"),
                ("tabindex", "0"),
                ("aria-expanded", aria_expanded),
                ("aria-label", label),
                ("data-toc-index", index.as_str()),
            ],
        ),
        vec![text(glyph)],
    )
}

fn render_label(node: &TocNode, is_active: bool) -> Handle {
    match node.anchor() {
        Some(anchor) => {
            let href = format!("#{anchor}");
            let link = if is_active {
                element("a", &[("href", href.as_str()), ("class", "active")])
            } else {
                element("a", &[("href", href.as_str())])
            };
            with_children(link, vec![text(node.label())])
        }
        None => with_children(
            element("span", &[("class", "toc-label")]),
            vec![text(node.label())],
        ),
    }
}

/// One fold control serialized on its own, for hosts patching a single node
pub fn fold_control_html(controller: &TocController, fold_index: usize) -> Option<String> {
    let fold = controller.tree().fold_at(fold_index)?;
    outer_html(&render_fold_control(controller, fold_index, fold)).ok()
}
