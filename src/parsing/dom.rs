//! Small helpers over `markup5ever_rcdom` nodes: lookups used while reading an
//! exported document and a builder used to emit the widget markup.

use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::RefCell;
use std::rc::Rc;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Lower-case local name of an element node
pub fn tag_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref().to_ascii_lowercase()),
        _ => None,
    }
}

pub fn is_element(node: &Handle, tag: &str) -> bool {
    tag_name(node).is_some_and(|name| name == tag)
}

pub fn is_list(node: &Handle) -> bool {
    is_element(node, "ul") || is_element(node, "ol")
}

pub fn is_heading(node: &Handle) -> bool {
    matches!(
        tag_name(node).as_deref(),
        Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6")
    )
}

pub fn attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == attr_name)
            .map(|attr| String::from(&*attr.value)),
        _ => None,
    }
}

pub fn has_class(node: &Handle, class: &str) -> bool {
    attr(node, "class").is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

pub fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// Depth-first, document-order search below `node` (excluding `node` itself)
pub fn find_descendant(node: &Handle, predicate: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if predicate(child) {
            return Some(child.clone());
        }
        if let Some(found) = find_descendant(child, predicate) {
            return Some(found);
        }
    }
    None
}

/// Like [`find_descendant`] but does not descend into nodes matching `skip`
pub fn find_descendant_skipping(
    node: &Handle,
    predicate: &dyn Fn(&Handle) -> bool,
    skip: &dyn Fn(&Handle) -> bool,
) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if skip(child) {
            continue;
        }
        if predicate(child) {
            return Some(child.clone());
        }
        if let Some(found) = find_descendant_skipping(child, predicate, skip) {
            return Some(found);
        }
    }
    None
}

pub fn collect_descendants(
    node: &Handle,
    predicate: &dyn Fn(&Handle) -> bool,
    output: &mut Vec<Handle>,
) {
    for child in node.children.borrow().iter() {
        if predicate(child) {
            output.push(child.clone());
        }
        collect_descendants(child, predicate, output);
    }
}

/// Text content of `node`, skipping any subtree matching `skip`
pub fn collect_text(node: &Handle, skip: &dyn Fn(&Handle) -> bool, output: &mut String) {
    match &node.data {
        NodeData::Text { contents } => output.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                if !skip(child) {
                    collect_text(child, skip, output);
                }
            }
        }
    }
}

/// Text content with runs of whitespace collapsed to single spaces
pub fn normalized_text(node: &Handle, skip: &dyn Fn(&Handle) -> bool) -> String {
    let mut raw = String::new();
    collect_text(node, skip, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let attrs = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from(*name)),
            value: StrTendril::from_slice(value),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn text(contents: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(contents)),
    })
}

pub fn append(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

pub fn with_children(parent: Handle, children: Vec<Handle>) -> Handle {
    for child in children {
        append(&parent, child);
    }
    parent
}

/// Detach every child of `parent` and adopt `children` in their place
pub fn replace_children(parent: &Handle, children: Vec<Handle>) {
    let old = std::mem::take(&mut *parent.children.borrow_mut());
    for child in old {
        child.parent.set(None);
    }
    for child in children {
        append(parent, child);
    }
}

/// Replace the text of `node` with a single text child
pub fn set_text(node: &Handle, contents: &str) {
    replace_children(node, vec![text(contents)]);
}

/// Serialize `node` itself (including its own tag) to HTML
pub fn outer_html(node: &Handle) -> anyhow::Result<String> {
    serialize(node, TraversalScope::IncludeNode)
}

/// Serialize only the children of `node`; for a document this is the whole page
pub fn inner_html(node: &Handle) -> anyhow::Result<String> {
    serialize(node, TraversalScope::ChildrenOnly(None))
}

fn serialize(node: &Handle, traversal_scope: TraversalScope) -> anyhow::Result<String> {
    let mut bytes = Vec::new();
    let handle: SerializableHandle = node.clone().into();
    html5ever::serialize(
        &mut bytes,
        &handle,
        SerializeOpts {
            traversal_scope,
            ..Default::default()
        },
    )?;
    Ok(String::from_utf8(bytes)?)
}
