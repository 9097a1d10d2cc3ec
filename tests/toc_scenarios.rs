use orgtoc::config::TocConfig;
use orgtoc::fold_state::FoldSnapshot;
use orgtoc::session_storage::{MemorySessionStorage, SessionStorage};
use orgtoc::test_utils::fixtures::{
    RecordingViewport, UnavailableSessionStorage, export_document, manual_items,
    scenario_a_items,
};
use orgtoc::viewport::{HeadingRect, IntersectionEntry, LinkClick};
use orgtoc::{Fold, TocChange, TocController};

fn load(html: &str, storage: Box<dyn SessionStorage>) -> TocController {
    TocController::from_html(html, storage, TocConfig::default())
        .expect("fixture document has a table of contents")
}

fn fold_of(controller: &TocController, anchor: &str) -> Option<Fold> {
    let link = controller.tree().find_link(anchor)?;
    let path = &controller.tree().links()[link].path;
    controller.tree().node(path)?.fold()
}

#[test]
fn test_scenario_a_collapsed_node_survives_reload() {
    let html = export_document(&scenario_a_items());
    let mut toc = load(&html, Box::new(MemorySessionStorage::new()));

    // A is fold control 0, C is fold control 1
    toc.toggle_node(1);
    toc.save_state();

    // Reload the page within the same session
    let storage = toc.into_storage();
    let reloaded = load(&html, storage);

    assert_eq!(fold_of(&reloaded, "sec-c"), Some(Fold::Collapsed));
    assert_eq!(fold_of(&reloaded, "sec-a"), Some(Fold::Expanded));
    // B and D are leaves and carry no fold state
    assert_eq!(fold_of(&reloaded, "sec-b"), None);
    assert_eq!(fold_of(&reloaded, "sec-d"), None);
    assert!(!reloaded.is_tree_collapsed());

    let html = orgtoc::render::widget_html(&reloaded).unwrap();
    let sublists: Vec<&str> = html.matches("<ul class=\"toc-sublist").collect();
    assert_eq!(sublists.len(), 2);
    assert!(html.contains(concat!(
        r#"<ul class="toc-sublist toc-collapsed" hidden="hidden">"#,
        r#"<li class="toc-item toc-leaf">"#,
        r#"<span class="toc-fold toc-fold-placeholder" aria-hidden="true"></span>"#,
        r##"<a href="#sec-d">D</a>"##
    )));
}

#[test]
fn test_scenario_b_unreadable_storage_uses_defaults() {
    let html = export_document(&scenario_a_items());
    let toc = load(&html, Box::new(UnavailableSessionStorage::new()));

    assert_eq!(toc.load_saved_state(), FoldSnapshot::default());
    assert!(!toc.is_tree_collapsed());
    assert!(toc.tree().collapsed_indices().is_empty());
}

#[test]
fn test_scenario_c_link_click_scrolls_below_header() {
    let html = export_document(&manual_items());
    let mut toc = load(&html, Box::new(MemorySessionStorage::new()));
    let mut viewport = RecordingViewport::new()
        .with_element("sec1", 120.0)
        .with_element("sec2", 1480.0);

    let outcome = toc.click_link("#sec2", &mut viewport);

    assert_eq!(
        outcome,
        LinkClick::Scrolled {
            target: "sec2".to_string(),
            top: 1380.0
        }
    );
    assert_eq!(viewport.scrolls, vec![1380.0]);
    assert_eq!(viewport.current_fragment(), Some("#sec2"));
    assert_eq!(viewport.history.len(), 1);
}

#[test]
fn test_scenario_d_heading_in_band_activates_link() {
    let html = export_document(&manual_items());
    let mut toc = load(&html, Box::new(MemorySessionStorage::new()));
    toc.collapse_all();
    let saved = toc.load_saved_state();

    toc.on_intersection(&[IntersectionEntry::entering("sec3")]);
    assert_eq!(toc.active_anchor(), Some("sec3"));

    toc.take_changes();
    toc.on_intersection(&[IntersectionEntry::entering("sec1-2-2")]);

    assert_eq!(toc.active_anchor(), Some("sec1-2-2"));
    assert_eq!(fold_of(&toc, "sec1"), Some(Fold::Expanded));
    assert_eq!(fold_of(&toc, "sec1-2"), Some(Fold::Expanded));
    assert_eq!(fold_of(&toc, "sec2"), Some(Fold::Collapsed));

    let changes = toc.take_changes();
    assert_eq!(
        changes[0],
        TocChange::ActiveLink {
            link_index: toc.tree().find_link("sec1-2-2")
        }
    );

    // Auto-expansion is navigation, not a user choice
    assert_eq!(toc.load_saved_state(), saved);

    let html = orgtoc::render::widget_html(&toc).unwrap();
    assert_eq!(html.matches("class=\"active\"").count(), 1);
}

#[test]
fn test_scenario_d_heading_geometry_activates_link() {
    let html = export_document(&manual_items());
    let mut toc = load(&html, Box::new(MemorySessionStorage::new()));
    toc.collapse_all();

    // Default band of an 800px viewport: 160..160
    toc.on_layout(
        &[
            HeadingRect::new("sec1-1", -300.0, -260.0),
            HeadingRect::new("sec1-2-1", 140.0, 180.0),
            HeadingRect::new("sec2", 600.0, 640.0),
        ],
        800.0,
    );

    assert_eq!(toc.active_anchor(), Some("sec1-2-1"));
    assert_eq!(fold_of(&toc, "sec1"), Some(Fold::Expanded));
    assert_eq!(fold_of(&toc, "sec1-2"), Some(Fold::Expanded));
    assert_eq!(fold_of(&toc, "sec2"), Some(Fold::Collapsed));

    // Scrolling on: the old heading leaves, the next one reaches the band
    toc.on_layout(
        &[
            HeadingRect::new("sec1-2-1", -200.0, -160.0),
            HeadingRect::new("sec2", 150.0, 190.0),
        ],
        800.0,
    );
    assert_eq!(toc.active_anchor(), Some("sec2"));
    assert_eq!(fold_of(&toc, "sec2"), Some(Fold::Collapsed));
}

#[test]
fn test_observed_headings_cover_every_section() {
    let html = export_document(&manual_items());
    let toc = load(&html, Box::new(MemorySessionStorage::new()));

    assert_eq!(toc.observed_headings().len(), 8);
    assert_eq!(toc.observed_headings()[0], "sec1");
    assert_eq!(toc.tree().title, "Table of Contents");
}

#[test]
fn test_fold_state_round_trip() {
    let html = export_document(&manual_items());
    let branch_count = load(&html, Box::new(MemorySessionStorage::new()))
        .tree()
        .branch_count();

    // Every subset of branches, with and without the whole tree collapsed
    for mask in 0..(1usize << branch_count) {
        for tree_collapsed in [false, true] {
            let mut toc = load(&html, Box::new(MemorySessionStorage::new()));
            for fold_index in (0..branch_count).filter(|&i| mask & (1 << i) != 0) {
                toc.toggle_node(fold_index);
            }
            if tree_collapsed {
                toc.toggle_whole_tree();
            }
            let expected = toc.tree().collapsed_indices();

            let reloaded = load(&html, toc.into_storage());

            assert_eq!(
                reloaded.tree().collapsed_indices(),
                expected,
                "mask {mask:#b}"
            );
            assert_eq!(reloaded.is_tree_collapsed(), tree_collapsed);
        }
    }
}

#[test]
fn test_mixed_operations_round_trip() {
    let html = export_document(&manual_items());
    let mut toc = load(&html, Box::new(MemorySessionStorage::new()));

    toc.collapse_all();
    toc.toggle_node(0);
    toc.toggle_node(2);
    toc.expand_node(1);
    toc.collapse_node(1);
    toc.toggle_whole_tree();
    let expected = toc.tree().collapsed_indices();

    let reloaded = load(&html, toc.into_storage());

    assert_eq!(reloaded.tree().collapsed_indices(), expected);
    assert!(reloaded.is_tree_collapsed());
}

#[test]
fn test_expand_all_leaves_every_control_expanded() {
    let html = export_document(&manual_items());
    let mut toc = load(&html, Box::new(MemorySessionStorage::new()));
    toc.collapse_all();
    toc.toggle_whole_tree();

    toc.expand_all();

    assert!(!toc.is_tree_collapsed());
    for fold_index in 0..toc.tree().branch_count() {
        assert_eq!(toc.tree().fold_at(fold_index), Some(Fold::Expanded));
        assert_eq!(toc.indicator(Fold::Expanded).0, "▼");
    }
    let html = orgtoc::render::widget_html(&toc).unwrap();
    assert!(!html.contains("aria-label=\"Expand\""));
}

#[test]
fn test_collapse_all_is_idempotent_and_skips_placeholders() {
    let html = export_document(&manual_items());
    let mut toc = load(&html, Box::new(MemorySessionStorage::new()));

    toc.collapse_all();
    let once = orgtoc::render::widget_html(&toc).unwrap();
    toc.collapse_all();
    let twice = orgtoc::render::widget_html(&toc).unwrap();

    assert_eq!(once, twice);
    let placeholders = toc
        .tree()
        .controls()
        .iter()
        .filter(|control| control.is_placeholder())
        .count();
    assert_eq!(
        twice.matches(r#"<span class="toc-fold toc-fold-placeholder" aria-hidden="true"></span>"#)
            .count(),
        placeholders
    );
}

#[test]
fn test_document_without_toc_is_ignored() {
    let toc = TocController::from_html(
        "<html><body><h2 id=\"x\">Only a heading</h2></body></html>",
        Box::new(MemorySessionStorage::new()),
        TocConfig::default(),
    );
    assert!(toc.is_none());
}
