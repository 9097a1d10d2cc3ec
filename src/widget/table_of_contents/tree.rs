/// Fold state of a single branch in the TOC tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fold {
    Expanded,
    Collapsed,
}

impl Fold {
    pub fn is_collapsed(self) -> bool {
        self == Fold::Collapsed
    }

    pub fn toggled(self) -> Self {
        match self {
            Fold::Expanded => Fold::Collapsed,
            Fold::Collapsed => Fold::Expanded,
        }
    }
}

/// A node of the navigation tree derived from the exported list markup
#[derive(Clone, Debug)]
pub enum TocNode {
    /// A list item without a sublist; rendered with a placeholder control
    Leaf {
        label: String,
        anchor: Option<String>,
        depth: usize,
    },
    /// A list item owning a nested sublist; rendered with a fold control
    Branch {
        label: String,
        anchor: Option<String>,
        depth: usize,
        children: Vec<TocNode>,
        fold: Fold,
    },
}

impl TocNode {
    pub fn leaf(label: impl Into<String>, anchor: Option<String>, depth: usize) -> Self {
        TocNode::Leaf {
            label: label.into(),
            anchor,
            depth,
        }
    }

    pub fn branch(
        label: impl Into<String>,
        anchor: Option<String>,
        depth: usize,
        children: Vec<TocNode>,
    ) -> Self {
        TocNode::Branch {
            label: label.into(),
            anchor,
            depth,
            children,
            fold: Fold::Expanded,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TocNode::Leaf { label, .. } => label,
            TocNode::Branch { label, .. } => label,
        }
    }

    /// Target section id of this item's link, without the leading `#`
    pub fn anchor(&self) -> Option<&str> {
        match self {
            TocNode::Leaf { anchor, .. } => anchor.as_deref(),
            TocNode::Branch { anchor, .. } => anchor.as_deref(),
        }
    }

    /// Number of list levels between this item and the tree's root list
    pub fn depth(&self) -> usize {
        match self {
            TocNode::Leaf { depth, .. } => *depth,
            TocNode::Branch { depth, .. } => *depth,
        }
    }

    pub fn children(&self) -> &[TocNode] {
        match self {
            TocNode::Leaf { .. } => &[],
            TocNode::Branch { children, .. } => children,
        }
    }

    /// `None` for leaves, which carry no fold state
    pub fn fold(&self) -> Option<Fold> {
        match self {
            TocNode::Leaf { .. } => None,
            TocNode::Branch { fold, .. } => Some(*fold),
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, TocNode::Branch { .. })
    }

    /// Set the fold state; returns true if it changed. Leaves ignore this.
    pub fn set_fold(&mut self, new_fold: Fold) -> bool {
        if let TocNode::Branch { fold, .. } = self {
            if *fold != new_fold {
                *fold = new_fold;
                return true;
            }
        }
        false
    }
}

/// Child-index path from the root list to a node
pub type NodePath = Vec<usize>;

/// The control rendered next to a list item
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlKind {
    /// A real fold toggle, numbered in pre-order among branches
    Toggle { fold_index: usize },
    /// Invisible spacer next to a leaf
    Placeholder,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoldControl {
    pub kind: ControlKind,
    pub path: NodePath,
}

impl FoldControl {
    pub fn is_placeholder(&self) -> bool {
        self.kind == ControlKind::Placeholder
    }

    pub fn fold_index(&self) -> Option<usize> {
        match self.kind {
            ControlKind::Toggle { fold_index } => Some(fold_index),
            ControlKind::Placeholder => None,
        }
    }
}

/// Link of a TOC item in pre-order among all items
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkEntry {
    pub anchor: Option<String>,
    pub path: NodePath,
}

/// The derived navigation tree plus its pre-order indices
#[derive(Clone, Debug, Default)]
pub struct TocTree {
    pub title: String,
    roots: Vec<TocNode>,
    controls: Vec<FoldControl>,
    links: Vec<LinkEntry>,
    branch_controls: Vec<usize>,
}

impl TocTree {
    pub fn new(title: impl Into<String>, roots: Vec<TocNode>) -> Self {
        let mut controls = Vec::new();
        let mut links = Vec::new();
        Self::index_nodes(&roots, &mut Vec::new(), &mut 0, &mut controls, &mut links);
        let branch_controls = controls
            .iter()
            .enumerate()
            .filter(|(_, control)| !control.is_placeholder())
            .map(|(position, _)| position)
            .collect();

        Self {
            title: title.into(),
            roots,
            controls,
            links,
            branch_controls,
        }
    }

    fn index_nodes(
        nodes: &[TocNode],
        path: &mut NodePath,
        next_fold_index: &mut usize,
        controls: &mut Vec<FoldControl>,
        links: &mut Vec<LinkEntry>,
    ) {
        for (position, node) in nodes.iter().enumerate() {
            path.push(position);

            let kind = if node.is_branch() {
                let fold_index = *next_fold_index;
                *next_fold_index += 1;
                ControlKind::Toggle { fold_index }
            } else {
                ControlKind::Placeholder
            };
            controls.push(FoldControl {
                kind,
                path: path.clone(),
            });
            links.push(LinkEntry {
                anchor: node.anchor().map(str::to_string),
                path: path.clone(),
            });

            Self::index_nodes(node.children(), path, next_fold_index, controls, links);
            path.pop();
        }
    }

    pub fn roots(&self) -> &[TocNode] {
        &self.roots
    }

    /// Every control (toggles and placeholders) in pre-order
    pub fn controls(&self) -> &[FoldControl] {
        &self.controls
    }

    pub fn links(&self) -> &[LinkEntry] {
        &self.links
    }

    pub fn branch_count(&self) -> usize {
        self.branch_controls.len()
    }

    pub fn control_for_fold_index(&self, fold_index: usize) -> Option<&FoldControl> {
        self.branch_controls
            .get(fold_index)
            .and_then(|&position| self.controls.get(position))
    }

    pub fn node(&self, path: &[usize]) -> Option<&TocNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for &position in rest {
            node = node.children().get(position)?;
        }
        Some(node)
    }

    pub fn node_mut(&mut self, path: &[usize]) -> Option<&mut TocNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get_mut(*first)?;
        for &position in rest {
            node = match node {
                TocNode::Branch { children, .. } => children.get_mut(position)?,
                TocNode::Leaf { .. } => return None,
            };
        }
        Some(node)
    }

    pub fn fold_at(&self, fold_index: usize) -> Option<Fold> {
        let control = self.control_for_fold_index(fold_index)?;
        self.node(&control.path).and_then(TocNode::fold)
    }

    /// Set the fold of a branch by index; returns true if it changed
    pub fn set_fold_at(&mut self, fold_index: usize, fold: Fold) -> bool {
        let Some(path) = self
            .control_for_fold_index(fold_index)
            .map(|control| control.path.clone())
        else {
            return false;
        };
        self.node_mut(&path)
            .map(|node| node.set_fold(fold))
            .unwrap_or(false)
    }

    /// Fold indices of every collapsed branch, ascending
    pub fn collapsed_indices(&self) -> Vec<usize> {
        (0..self.branch_count())
            .filter(|&index| self.fold_at(index) == Some(Fold::Collapsed))
            .collect()
    }

    /// Depth of the node at `path`: ancestor list levels below the root list
    pub fn get_depth(&self, path: &[usize]) -> usize {
        path.len().saturating_sub(1)
    }

    /// First link (in pre-order) targeting `anchor`
    pub fn find_link(&self, anchor: &str) -> Option<usize> {
        self.links
            .iter()
            .position(|link| link.anchor.as_deref() == Some(anchor))
    }

    /// Fold indices of the branches enclosing the node at `path`, outermost first
    pub fn ancestor_fold_indices(&self, path: &[usize]) -> Vec<usize> {
        (1..path.len())
            .filter_map(|len| {
                let prefix = &path[..len];
                self.controls
                    .iter()
                    .find(|control| control.path == prefix)
                    .and_then(FoldControl::fold_index)
            })
            .collect()
    }
}
