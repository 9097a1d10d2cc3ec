pub mod render;
pub mod tree;

use crate::config::TocConfig;
use crate::fold_state::{self, FoldSnapshot};
use crate::parsing::document::ExportedDocument;
use crate::parsing::dom;
use crate::parsing::toc_parser::TocParser;
use crate::session_storage::SessionStorage;
use crate::viewport::{HeadingRect, IntersectionEntry, LinkClick, Viewport};
use log::{debug, warn};
use tree::{Fold, TocTree};

/// One visible change, in the order the presentation layer should apply it
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TocChange {
    Fold { fold_index: usize, fold: Fold },
    WholeTree { collapsed: bool },
    ActiveLink { link_index: Option<usize> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Backslash,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyInput {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            meta: false,
        }
    }

    pub fn meta(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: true,
        }
    }
}

/// Collapsible table of contents with session-scoped fold state
pub struct TocController {
    tree: TocTree,
    config: TocConfig,
    storage: Box<dyn SessionStorage>,
    tree_collapsed: bool,
    active_link: Option<usize>,
    observed_headings: Vec<String>,
    // What the last save tried to write; survives storage failures
    last_saved: FoldSnapshot,
    changes: Vec<TocChange>,
}

impl TocController {
    /// Build a controller over an already derived tree and restore this
    /// session's fold state from `storage`
    pub fn new(
        tree: TocTree,
        observed_headings: Vec<String>,
        storage: Box<dyn SessionStorage>,
        config: TocConfig,
    ) -> Self {
        let mut controller = Self {
            tree,
            config,
            storage,
            tree_collapsed: false,
            active_link: None,
            observed_headings,
            last_saved: FoldSnapshot::default(),
            changes: Vec::new(),
        };

        let snapshot = controller.load_saved_state();
        controller.restore_state(&snapshot);
        controller
    }

    /// Initialize from the HTML of an exported document. `None` when the
    /// document has no TOC container or the container has no list.
    pub fn from_html(
        html: &str,
        storage: Box<dyn SessionStorage>,
        config: TocConfig,
    ) -> Option<Self> {
        let document = match ExportedDocument::parse(html) {
            Ok(document) => document,
            Err(e) => {
                warn!("Could not read document for TOC: {e:?}");
                return None;
            }
        };
        Self::from_document(&document, storage, config)
    }

    pub fn from_document(
        document: &ExportedDocument,
        storage: Box<dyn SessionStorage>,
        config: TocConfig,
    ) -> Option<Self> {
        let Some(container) = document.find_toc_container(&config) else {
            debug!("No TOC container in document, leaving it untouched");
            return None;
        };
        let Some(tree) = TocParser::parse_container(&container, &config) else {
            debug!("TOC container holds no list, leaving it untouched");
            return None;
        };

        Some(Self::new(tree, document.heading_ids(), storage, config))
    }

    pub fn tree(&self) -> &TocTree {
        &self.tree
    }

    pub fn config(&self) -> &TocConfig {
        &self.config
    }

    pub fn storage(&self) -> &dyn SessionStorage {
        self.storage.as_ref()
    }

    pub fn is_tree_collapsed(&self) -> bool {
        self.tree_collapsed
    }

    pub fn active_link(&self) -> Option<usize> {
        self.active_link
    }

    pub fn active_anchor(&self) -> Option<&str> {
        self.active_link
            .and_then(|index| self.tree.links().get(index))
            .and_then(|link| link.anchor.as_deref())
    }

    /// Heading ids the host should observe for active-section tracking
    pub fn observed_headings(&self) -> &[String] {
        &self.observed_headings
    }

    /// Hand the storage back, e.g. to build the controller of a reloaded page
    pub fn into_storage(self) -> Box<dyn SessionStorage> {
        self.storage
    }

    pub fn last_saved(&self) -> &FoldSnapshot {
        &self.last_saved
    }

    /// Drain the changes recorded since the last call
    pub fn take_changes(&mut self) -> Vec<TocChange> {
        std::mem::take(&mut self.changes)
    }

    /// Glyph and accessible label shown on a fold control in state `fold`
    pub fn indicator(&self, fold: Fold) -> (&str, &str) {
        let labels = &self.config.labels;
        match fold {
            Fold::Expanded => (labels.expanded_glyph.as_str(), labels.collapse.as_str()),
            Fold::Collapsed => (labels.collapsed_glyph.as_str(), labels.expand.as_str()),
        }
    }

    fn apply_fold(&mut self, fold_index: usize, fold: Fold) -> bool {
        let changed = self.tree.set_fold_at(fold_index, fold);
        if changed {
            self.changes.push(TocChange::Fold { fold_index, fold });
        }
        changed
    }

    fn set_tree_collapsed(&mut self, collapsed: bool) {
        if self.tree_collapsed != collapsed {
            self.tree_collapsed = collapsed;
            self.changes.push(TocChange::WholeTree { collapsed });
        }
    }

    /// Flip one branch and save. Unknown indices are ignored.
    pub fn toggle_node(&mut self, fold_index: usize) {
        if let Some(fold) = self.tree.fold_at(fold_index) {
            self.set_node_fold(fold_index, fold.toggled(), true);
        }
    }

    pub fn expand_node(&mut self, fold_index: usize) {
        self.set_node_fold(fold_index, Fold::Expanded, true);
    }

    pub fn collapse_node(&mut self, fold_index: usize) {
        self.set_node_fold(fold_index, Fold::Collapsed, true);
    }

    /// Set one branch's fold; `save` is false for restores and auto-expansion
    pub fn set_node_fold(&mut self, fold_index: usize, fold: Fold, save: bool) {
        if self.tree.fold_at(fold_index).is_none() {
            debug!("No fold control with index {fold_index}");
            return;
        }
        self.apply_fold(fold_index, fold);
        if save {
            self.save_state();
        }
    }

    /// Expand every branch, deepest first, after clearing the whole-tree flag
    pub fn expand_all(&mut self) {
        self.set_tree_collapsed(false);

        let mut targets: Vec<(usize, usize)> = self
            .tree
            .controls()
            .iter()
            .filter_map(|control| {
                control
                    .fold_index()
                    .map(|index| (index, self.tree.get_depth(&control.path)))
            })
            .collect();
        targets.sort_by(|a, b| b.1.cmp(&a.1));

        for (fold_index, _) in targets {
            self.apply_fold(fold_index, Fold::Expanded);
        }
        self.save_state();
    }

    /// Collapse every branch, shallowest first. Placeholders are left alone.
    pub fn collapse_all(&mut self) {
        let mut targets: Vec<(usize, usize)> = self
            .tree
            .controls()
            .iter()
            .filter(|control| !control.is_placeholder())
            .filter_map(|control| {
                control
                    .fold_index()
                    .map(|index| (index, self.tree.get_depth(&control.path)))
            })
            .collect();
        targets.sort_by_key(|&(_, depth)| depth);

        for (fold_index, _) in targets {
            self.apply_fold(fold_index, Fold::Collapsed);
        }
        self.save_state();
    }

    /// Show or hide the whole content region
    pub fn toggle_whole_tree(&mut self) {
        self.set_tree_collapsed(!self.tree_collapsed);
        self.save_state();
    }

    pub fn snapshot(&self) -> FoldSnapshot {
        FoldSnapshot::new(self.tree_collapsed, self.tree.collapsed_indices())
    }

    /// Persist the current fold state. Never touches the tree; storage
    /// failures leave the state in memory only.
    pub fn save_state(&mut self) {
        let snapshot = self.snapshot();
        if let Err(e) = fold_state::write_state(
            self.storage.as_mut(),
            &self.config.storage_key,
            &snapshot,
        ) {
            warn!("Could not save TOC state, keeping it in memory: {e}");
        }
        self.last_saved = snapshot;
    }

    pub fn load_saved_state(&self) -> FoldSnapshot {
        fold_state::load_saved_state(self.storage.as_ref(), &self.config.storage_key)
    }

    /// Apply a saved snapshot without saving again
    pub fn restore_state(&mut self, snapshot: &FoldSnapshot) {
        self.set_tree_collapsed(snapshot.collapsed);

        for fold_index in snapshot.collapsed_indices() {
            if fold_index >= self.tree.branch_count() {
                debug!("Skipping saved fold index {fold_index}, no such control");
                continue;
            }
            self.apply_fold(fold_index, Fold::Collapsed);
        }
        self.last_saved = snapshot.clone();
    }

    /// Feed observations from the host's intersection primitive
    pub fn on_intersection(&mut self, entries: &[IntersectionEntry]) {
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            self.activate_section(&entry.target_id);
        }
    }

    /// Derive intersections from heading geometry using the configured band
    pub fn on_layout(&mut self, headings: &[HeadingRect], viewport_height: f64) {
        let entries: Vec<IntersectionEntry> = headings
            .iter()
            .map(|heading| IntersectionEntry {
                target_id: heading.id.clone(),
                is_intersecting: self.config.band.intersects(
                    heading.top,
                    heading.bottom,
                    viewport_height,
                ),
            })
            .collect();
        self.on_intersection(&entries);
    }

    /// Mark the link to `section_id` active and reveal the path to it.
    /// The expansion is not saved. Returns false if no link targets it.
    pub fn activate_section(&mut self, section_id: &str) -> bool {
        let Some(link_index) = self.tree.find_link(section_id) else {
            return false;
        };

        if self.active_link != Some(link_index) {
            self.active_link = Some(link_index);
            self.changes.push(TocChange::ActiveLink {
                link_index: Some(link_index),
            });
        }

        let path = self.tree.links()[link_index].path.clone();
        for fold_index in self.tree.ancestor_fold_indices(&path) {
            self.apply_fold(fold_index, Fold::Expanded);
        }
        true
    }

    pub fn clear_active(&mut self) {
        if self.active_link.take().is_some() {
            self.changes.push(TocChange::ActiveLink { link_index: None });
        }
    }

    /// Handle a click on a TOC link. In-page links to existing elements are
    /// scrolled to with header clearance and recorded as one history entry.
    pub fn click_link(&mut self, href: &str, viewport: &mut dyn Viewport) -> LinkClick {
        let Some(target) = href.strip_prefix('#').filter(|id| !id.is_empty()) else {
            return LinkClick::Default;
        };
        let Some(offset_top) = viewport.element_offset_top(target) else {
            debug!("Link target #{target} not found, using default navigation");
            return LinkClick::Default;
        };

        let top = offset_top - self.config.header_clearance;
        viewport.smooth_scroll_to(top);
        viewport.push_fragment(target);

        LinkClick::Scrolled {
            target: target.to_string(),
            top,
        }
    }

    /// Keyboard activation of a fold control. Returns true when consumed.
    pub fn handle_control_key(&mut self, fold_index: usize, input: KeyInput) -> bool {
        match input.key {
            Key::Enter | Key::Space => {
                self.toggle_node(fold_index);
                true
            }
            _ => false,
        }
    }

    /// Document-wide shortcut: Ctrl+\ or Cmd+\ flips the whole tree
    pub fn handle_global_key(&mut self, input: KeyInput) -> bool {
        if input.key == Key::Backslash && (input.ctrl || input.meta) {
            self.toggle_whole_tree();
            return true;
        }
        false
    }
}

/// Replace the TOC container of `document` with the interactive widget
/// markup. A document without a TOC is left as is.
pub fn decorate(
    document: &ExportedDocument,
    storage: Box<dyn SessionStorage>,
    config: TocConfig,
) -> Option<TocController> {
    let container = document.find_toc_container(&config)?;
    let controller = TocController::from_document(document, storage, config)?;

    dom::replace_children(&container, render::render_widget(&controller));
    Some(controller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_storage::{MemorySessionStorage, UnavailableSessionStorage};
    use crate::viewport::RecordingViewport;
    use tree::TocNode;

    // A > [B, C > [D > [E]]], F > [G]
    fn sample_tree() -> TocTree {
        TocTree::new(
            "Contents",
            vec![
                TocNode::branch(
                    "A",
                    Some("a".to_string()),
                    0,
                    vec![
                        TocNode::leaf("B", Some("b".to_string()), 1),
                        TocNode::branch(
                            "C",
                            Some("c".to_string()),
                            1,
                            vec![TocNode::branch(
                                "D",
                                Some("d".to_string()),
                                2,
                                vec![TocNode::leaf("E", Some("e".to_string()), 3)],
                            )],
                        ),
                    ],
                ),
                TocNode::branch(
                    "F",
                    Some("f".to_string()),
                    0,
                    vec![TocNode::leaf("G", Some("g".to_string()), 1)],
                ),
            ],
        )
    }

    fn controller_with(storage: Box<dyn SessionStorage>) -> TocController {
        TocController::new(
            sample_tree(),
            vec!["a".to_string(), "e".to_string()],
            storage,
            TocConfig::default(),
        )
    }

    fn controller() -> TocController {
        controller_with(Box::new(MemorySessionStorage::new()))
    }

    fn stored_json(controller: &TocController) -> Option<String> {
        controller
            .storage()
            .get_item(&controller.config().storage_key)
            .unwrap()
    }

    #[test]
    fn test_toggle_node_flips_and_saves() {
        let mut toc = controller();

        toc.toggle_node(1);
        assert_eq!(toc.tree().fold_at(1), Some(Fold::Collapsed));
        assert_eq!(
            stored_json(&toc).as_deref(),
            Some(r#"{"collapsed":false,"items":{"1":true}}"#)
        );

        toc.toggle_node(1);
        assert_eq!(toc.tree().fold_at(1), Some(Fold::Expanded));
        assert_eq!(
            stored_json(&toc).as_deref(),
            Some(r#"{"collapsed":false,"items":{}}"#)
        );
    }

    #[test]
    fn test_unsaved_fold_does_not_write() {
        let mut toc = controller();
        toc.set_node_fold(0, Fold::Collapsed, false);

        assert_eq!(toc.tree().fold_at(0), Some(Fold::Collapsed));
        assert_eq!(stored_json(&toc), None);
    }

    #[test]
    fn test_indicator_follows_fold() {
        let toc = controller();
        assert_eq!(toc.indicator(Fold::Expanded), ("▼", "Collapse"));
        assert_eq!(toc.indicator(Fold::Collapsed), ("▶", "Expand"));
    }

    #[test]
    fn test_expand_all_runs_deepest_first() {
        let mut toc = controller();
        toc.collapse_all();
        toc.toggle_whole_tree();
        toc.take_changes();

        toc.expand_all();
        let changes = toc.take_changes();

        assert_eq!(
            changes,
            vec![
                TocChange::WholeTree { collapsed: false },
                TocChange::Fold {
                    fold_index: 2,
                    fold: Fold::Expanded
                },
                TocChange::Fold {
                    fold_index: 1,
                    fold: Fold::Expanded
                },
                TocChange::Fold {
                    fold_index: 0,
                    fold: Fold::Expanded
                },
                TocChange::Fold {
                    fold_index: 3,
                    fold: Fold::Expanded
                },
            ]
        );
        assert!(toc.tree().collapsed_indices().is_empty());
    }

    #[test]
    fn test_collapse_all_runs_shallowest_first_and_is_idempotent() {
        let mut toc = controller();

        toc.collapse_all();
        let changes = toc.take_changes();
        let order: Vec<usize> = changes
            .iter()
            .filter_map(|change| match change {
                TocChange::Fold { fold_index, .. } => Some(*fold_index),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec![0, 3, 1, 2]);

        let first = toc.snapshot();
        toc.collapse_all();
        assert!(toc.take_changes().is_empty());
        assert_eq!(toc.snapshot(), first);
    }

    #[test]
    fn test_toggle_whole_tree_persists_flag() {
        let mut toc = controller();
        toc.toggle_whole_tree();

        assert!(toc.is_tree_collapsed());
        assert_eq!(
            stored_json(&toc).as_deref(),
            Some(r#"{"collapsed":true,"items":{}}"#)
        );
    }

    #[test]
    fn test_restore_skips_unknown_indices() {
        let mut toc = controller();
        let snapshot =
            FoldSnapshot::from_json(r#"{"collapsed":false,"items":{"2":true,"40":true}}"#)
                .unwrap();

        toc.restore_state(&snapshot);

        assert_eq!(toc.tree().collapsed_indices(), vec![2]);
        assert_eq!(stored_json(&toc), None);
    }

    #[test]
    fn test_state_restored_on_construction() {
        let storage = MemorySessionStorage::with_item(
            "org-toc-state",
            r#"{"collapsed":true,"items":{"3":true}}"#,
        );
        let toc = controller_with(Box::new(storage));

        assert!(toc.is_tree_collapsed());
        assert_eq!(toc.tree().collapsed_indices(), vec![3]);
    }

    #[test]
    fn test_unavailable_storage_keeps_state_in_memory() {
        let mut toc = controller_with(Box::new(UnavailableSessionStorage::new()));

        toc.collapse_node(0);

        assert_eq!(toc.last_saved().collapsed_indices(), vec![0]);
        let storage = toc
            .storage()
            .as_any()
            .downcast_ref::<UnavailableSessionStorage>()
            .unwrap();
        assert_eq!(storage.get_attempted_writes().len(), 1);
    }

    #[test]
    fn test_activation_expands_ancestors_without_saving() {
        let mut toc = controller();
        toc.collapse_all();
        let saved = stored_json(&toc);

        assert!(toc.activate_section("e"));

        assert_eq!(toc.active_anchor(), Some("e"));
        assert_eq!(toc.tree().fold_at(0), Some(Fold::Expanded));
        assert_eq!(toc.tree().fold_at(1), Some(Fold::Expanded));
        assert_eq!(toc.tree().fold_at(2), Some(Fold::Expanded));
        assert_eq!(toc.tree().fold_at(3), Some(Fold::Collapsed));
        assert_eq!(stored_json(&toc), saved);
    }

    #[test]
    fn test_single_active_link() {
        let mut toc = controller();
        toc.on_intersection(&[
            IntersectionEntry::entering("a"),
            IntersectionEntry::leaving("b"),
            IntersectionEntry::entering("g"),
        ]);

        assert_eq!(toc.active_anchor(), Some("g"));
        assert!(!toc.activate_section("missing"));
        assert_eq!(toc.active_anchor(), Some("g"));

        toc.clear_active();
        assert_eq!(toc.active_link(), None);
    }

    #[test]
    fn test_layout_uses_configured_band() {
        let mut config = TocConfig::default();
        config.band.top_margin_percent = -50.0;
        config.band.bottom_margin_percent = -40.0;
        let mut toc = TocController::new(
            sample_tree(),
            Vec::new(),
            Box::new(MemorySessionStorage::new()),
            config,
        );

        // The band spans 500..600 of a 1000px viewport
        toc.on_layout(
            &[
                HeadingRect::new("a", 100.0, 140.0),
                HeadingRect::new("c", 520.0, 560.0),
            ],
            1000.0,
        );
        assert_eq!(toc.active_anchor(), Some("c"));

        // Inside the default band (200..200) but outside this one
        toc.on_layout(&[HeadingRect::new("f", 190.0, 230.0)], 1000.0);
        assert_eq!(toc.active_anchor(), Some("c"));
    }

    #[test]
    fn test_click_link_scrolls_with_clearance() {
        let mut toc = controller();
        let mut viewport = RecordingViewport::new().with_element("c", 640.0);

        let outcome = toc.click_link("#c", &mut viewport);

        assert_eq!(
            outcome,
            LinkClick::Scrolled {
                target: "c".to_string(),
                top: 540.0
            }
        );
        assert_eq!(viewport.scrolls, vec![540.0]);
        assert_eq!(viewport.history, vec!["#c".to_string()]);
    }

    #[test]
    fn test_click_link_falls_back_to_default() {
        let mut toc = controller();
        let mut viewport = RecordingViewport::new();

        assert_eq!(toc.click_link("#nowhere", &mut viewport), LinkClick::Default);
        assert_eq!(
            toc.click_link("https://example.com", &mut viewport),
            LinkClick::Default
        );
        assert!(viewport.scrolls.is_empty());
        assert!(viewport.history.is_empty());
    }

    #[test]
    fn test_keyboard_activation() {
        let mut toc = controller();

        assert!(toc.handle_control_key(0, KeyInput::plain(Key::Enter)));
        assert_eq!(toc.tree().fold_at(0), Some(Fold::Collapsed));
        assert!(toc.handle_control_key(0, KeyInput::plain(Key::Space)));
        assert_eq!(toc.tree().fold_at(0), Some(Fold::Expanded));
        assert!(!toc.handle_control_key(0, KeyInput::plain(Key::Other)));

        assert!(!toc.handle_global_key(KeyInput::plain(Key::Backslash)));
        assert!(toc.handle_global_key(KeyInput::ctrl(Key::Backslash)));
        assert!(toc.is_tree_collapsed());
        assert!(toc.handle_global_key(KeyInput::meta(Key::Backslash)));
        assert!(!toc.is_tree_collapsed());
    }
}
