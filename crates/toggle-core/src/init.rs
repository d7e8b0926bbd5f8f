//! Session setup and teardown.

use std::collections::BTreeMap;

use crate::cell::{PairRecord, ToggleBinding, process_cell};
use crate::context::ToggleContext;
use crate::global::setup_global;
use crate::platform::TogglePlatform;
use crate::storage::KeyValueStore;

/// Document readiness, as reported by `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Parse a `readyState` string. Unknown values are treated as ready.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "loading" => ReadyState::Loading,
            "interactive" => ReadyState::Interactive,
            _ => ReadyState::Complete,
        }
    }

    /// Whether initialization has to wait for the ready event instead of
    /// running now. Exactly one of the two paths is taken.
    pub fn must_defer(self) -> bool {
        self == ReadyState::Loading
    }
}

/// Everything one initialization created.
pub struct ToggleSession<P: TogglePlatform> {
    /// Per-pair and per-cell bindings, in document order.
    pub bindings: Vec<ToggleBinding<P>>,
    /// The page-wide binding, if one was created.
    pub global: Option<ToggleBinding<P>>,
    /// Every pair that got a button, in document order.
    pub pairs: Vec<PairRecord<P>>,
    /// Number of toggle-marked cells seen.
    pub cells: usize,
}

impl<P: TogglePlatform> ToggleSession<P> {
    /// Every per-pair button, in document order.
    pub fn buttons(&self) -> Vec<P::Button> {
        self.bindings
            .iter()
            .map(|binding| binding.button.clone())
            .collect()
    }

    /// Every region that has a button, in document order.
    pub fn regions(&self) -> Vec<P::Region> {
        self.pairs
            .iter()
            .flat_map(|pair| pair.regions.iter().cloned())
            .collect()
    }

    /// Current hidden state per toggle id, sampled from the first region.
    pub fn snapshot(&self, platform: &P) -> BTreeMap<String, bool> {
        self.pairs
            .iter()
            .filter_map(|pair| {
                let first = pair.regions.first()?;
                Some((pair.toggle_id.to_string(), platform.is_hidden(first)))
            })
            .collect()
    }
}

/// Set up toggles for the whole page.
///
/// Order is fixed: the live region first, then every toggle-marked cell in
/// document order, then the page-wide button, which needs every cell's regions
/// and buttons to exist.
pub fn initialize<P, S>(ctx: &ToggleContext<P, S>) -> ToggleSession<P>
where
    P: TogglePlatform,
    S: KeyValueStore,
{
    ctx.announcer().setup(ctx.platform());

    let mut session = ToggleSession {
        bindings: Vec::new(),
        global: None,
        pairs: Vec::new(),
        cells: 0,
    };

    for (index, cell) in ctx.platform().toggle_cells().iter().enumerate() {
        let outcome = process_cell(ctx, cell, index);
        session.bindings.extend(outcome.bindings);
        session.pairs.extend(outcome.pairs);
        session.cells += 1;
    }

    session.global = setup_global(ctx, &session.regions(), &session.buttons());

    tracing::debug!(
        cells = session.cells,
        buttons = session.bindings.len(),
        global = session.global.is_some(),
        "output toggles initialized"
    );
    session
}

/// Remove every button and the live region the session created.
///
/// Region visibility is left as it is.
pub fn teardown<P, S>(ctx: &ToggleContext<P, S>, session: ToggleSession<P>)
where
    P: TogglePlatform,
    S: KeyValueStore,
{
    let platform = ctx.platform();
    for binding in &session.bindings {
        platform.remove_button(&binding.button);
    }
    if let Some(global) = &session.global {
        platform.remove_button(&global.button);
    }
    ctx.announcer().teardown(platform);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::ButtonPresentation;
    use crate::config::{AttributeMarkers, ToggleOptions};
    use crate::testing::{MemoryPage, MemoryStore, markers};

    type Ctx = ToggleContext<MemoryPage, MemoryStore>;

    fn start(page: MemoryPage, store: &MemoryStore) -> (Ctx, ToggleSession<MemoryPage>) {
        let ctx = ToggleContext::new(page, store.clone(), ToggleOptions::default());
        let session = initialize(&ctx);
        (ctx, session)
    }

    #[test]
    fn test_ready_state() {
        assert!(ReadyState::parse("loading").must_defer());
        assert!(!ReadyState::parse("interactive").must_defer());
        assert!(!ReadyState::parse("complete").must_defer());
        assert_eq!(ReadyState::parse("weird"), ReadyState::Complete);
    }

    #[test]
    fn test_announcer_created_even_without_cells() {
        let (ctx, session) = start(MemoryPage::new("/"), &MemoryStore::new());
        assert_eq!(session.cells, 0);
        assert!(session.global.is_none());
        assert_eq!(ctx.platform().live_region_count(), 1);
    }

    #[test]
    fn test_scenario_individual_mode() {
        let mut page = MemoryPage::new("/");
        page.add_cell(markers(&[("hidden", "false")]), &[("a", 1)]);
        let (ctx, session) = start(page, &MemoryStore::new());
        let page = ctx.platform();

        let binding = &session.bindings[0];
        let region = binding.group.regions[0];
        assert!(!page.is_hidden(&region));
        assert_eq!(page.button_label(binding.button), "Output");
        assert_eq!(
            page.presentation(binding.button).map(|p| p.tooltip),
            Some("Hide output".to_string())
        );

        assert!(ctx.activate(binding, session.global.as_ref()));
        assert!(page.is_hidden(&region));
        assert_eq!(
            page.presentation(binding.button).map(|p| p.tooltip),
            Some("Show output".to_string())
        );
        page.run_frame();
        assert_eq!(page.live_text().as_deref(), Some("Output hidden"));
    }

    #[test]
    fn test_scenario_synchronized_mode() {
        let mut page = MemoryPage::new("/notebooks/analysis.html");
        page.add_cell(
            markers(&[("sync", "true"), ("persist", "true"), ("hidden", "false")]),
            &[("a", 1), ("b", 1)],
        );
        let store = MemoryStore::new();

        let (ctx, session) = start(page.reload(), &store);
        let first_page = ctx.platform();
        assert!(session.regions().iter().all(|r| !first_page.is_hidden(r)));

        ctx.activate(&session.bindings[0], None);
        assert!(session.regions().iter().all(|r| first_page.is_hidden(r)));
        for button in session.buttons() {
            assert_eq!(
                first_page.presentation(button),
                Some(ButtonPresentation::pair(true))
            );
        }
        assert_eq!(
            store
                .get("output-toggle-_notebooks_analysis.html-cell-0")
                .as_deref(),
            Some("true")
        );

        let (ctx, session) = start(page.reload(), &store);
        let reloaded = ctx.platform();
        assert!(session.regions().iter().all(|r| reloaded.is_hidden(r)));
        for button in session.buttons() {
            assert_eq!(reloaded.presentation(button), Some(ButtonPresentation::pair(true)));
        }
    }

    fn three_cell_page() -> MemoryPage {
        let page_markers = markers(&[("global", "true"), ("persist", "true")]);
        let mut page = MemoryPage::new("/report.html").with_page_markers(page_markers);
        page.add_cell(AttributeMarkers::default(), &[("a", 1)]);
        page.add_cell(markers(&[("sync", "true")]), &[("b", 1), ("c", 2)]);
        page.add_cell(AttributeMarkers::default(), &[("d", 1), ("e", 1)]);
        page
    }

    #[test]
    fn test_scenario_global_override() {
        let page = three_cell_page();
        let store = MemoryStore::new();

        let (ctx, session) = start(page.reload(), &store);
        let global = session.global.as_ref().expect("global button");
        assert_eq!(ctx.platform().global_button_count(), 1);
        assert_eq!(ctx.platform().button_label(global.button), "Hide all outputs");

        assert!(ctx.activate(global, None));
        let first = ctx.platform();
        assert!(first.all_regions().iter().all(|r| first.is_hidden(r)));
        assert_eq!(first.button_label(global.button), "Show all outputs");
        for button in session.buttons() {
            assert_eq!(first.presentation(button), Some(ButtonPresentation::pair(true)));
        }
        assert_eq!(
            store.get("output-toggle-_report.html-global").as_deref(),
            Some("true")
        );

        let (ctx, session) = start(page.reload(), &store);
        let reloaded = ctx.platform();
        assert!(reloaded.all_regions().iter().all(|r| reloaded.is_hidden(r)));
        let global = session.global.as_ref().expect("global button");
        assert_eq!(reloaded.button_label(global.button), "Show all outputs");
        for button in session.buttons() {
            assert_eq!(reloaded.presentation(button), Some(ButtonPresentation::pair(true)));
        }
    }

    #[test]
    fn test_global_state_beats_cell_state_at_load() {
        let page = three_cell_page();
        let store = MemoryStore::new();
        store.insert("output-toggle-_report.html-pair-a", "false");
        store.insert("output-toggle-_report.html-global", "true");

        let (ctx, session) = start(page, &store);
        let page = ctx.platform();
        assert!(session.regions().iter().all(|r| page.is_hidden(r)));
    }

    #[test]
    fn test_global_without_persisted_value_summarizes_page() {
        let page_markers = markers(&[("global", "true"), ("hidden", "true")]);
        let mut page = MemoryPage::new("/").with_page_markers(page_markers);
        page.add_cell(AttributeMarkers::default(), &[("a", 1)]);
        page.add_cell(markers(&[("hidden", "false")]), &[("b", 1)]);

        let (ctx, session) = start(page, &MemoryStore::new());
        let global = session.global.as_ref().expect("global button");
        // Mixed page: not all hidden, so the button offers to hide.
        assert_eq!(ctx.platform().button_label(global.button), "Hide all outputs");

        ctx.activate(global, None);
        let page = ctx.platform();
        assert!(session.regions().iter().all(|r| page.is_hidden(r)));
    }

    #[test]
    fn test_pair_action_refreshes_global_button() {
        let page_markers = markers(&[("global", "true")]);
        let mut page = MemoryPage::new("/").with_page_markers(page_markers);
        page.add_cell(AttributeMarkers::default(), &[("a", 1)]);
        page.add_cell(AttributeMarkers::default(), &[("b", 1)]);

        let (ctx, session) = start(page, &MemoryStore::new());
        let global = session.global.as_ref();
        ctx.activate(&session.bindings[0], global);
        let page = ctx.platform();
        let global_button = global.expect("global button").button;
        assert_eq!(page.button_label(global_button), "Hide all outputs");

        ctx.activate(&session.bindings[1], global);
        assert_eq!(page.button_label(global_button), "Show all outputs");
    }

    #[test]
    fn test_custom_global_label() {
        let page_markers = markers(&[("global", "true"), ("global_label", "All code output")]);
        let mut page = MemoryPage::new("/").with_page_markers(page_markers);
        page.add_cell(AttributeMarkers::default(), &[("a", 1)]);

        let (ctx, session) = start(page, &MemoryStore::new());
        let global = session.global.as_ref().expect("global button");
        ctx.activate(global, None);
        let presentation = ctx.platform().presentation(global.button).unwrap();
        assert_eq!(presentation.text.as_deref(), Some("All code output"));
        assert_eq!(presentation.tooltip, "Show all outputs");
    }

    #[test]
    fn test_global_skipped_when_nothing_to_toggle() {
        let page_markers = markers(&[("global", "true")]);
        let mut page = MemoryPage::new("/").with_page_markers(page_markers);
        page.add_cell(AttributeMarkers::default(), &[("a", 0)]);

        let (ctx, session) = start(page, &MemoryStore::new());
        assert!(session.global.is_none());
        assert_eq!(ctx.platform().button_count(), 0);
    }

    #[test]
    fn test_global_requires_page_flag() {
        let mut page = MemoryPage::new("/");
        page.add_cell(AttributeMarkers::default(), &[("a", 1)]);

        let (_ctx, session) = start(page, &MemoryStore::new());
        assert!(session.global.is_none());
    }

    #[test]
    fn test_cell_indices_follow_document_order() {
        let mut page = MemoryPage::new("/p");
        page.add_cell(AttributeMarkers::default(), &[("a", 1)]);
        page.add_cell(markers(&[("sync", "true"), ("persist", "true")]), &[("b", 1)]);

        let (_ctx, session) = start(page, &MemoryStore::new());
        assert_eq!(
            session.bindings[1].storage_key.as_deref(),
            Some("output-toggle-_p-cell-1")
        );
    }

    #[test]
    fn test_unavailable_storage_degrades_to_defaults() {
        let page = three_cell_page();
        let store = MemoryStore::unavailable();

        let (ctx, session) = start(page, &store);
        let global = session.global.as_ref().expect("global button");
        assert!(ctx.activate(global, None));
        assert!(store.is_empty());
        assert!(!ctx.storage().is_available());
    }

    #[test]
    fn test_snapshot() {
        let mut page = MemoryPage::new("/");
        page.add_cell(markers(&[("hidden", "true")]), &[("a", 1)]);
        page.add_cell(AttributeMarkers::default(), &[("b", 2)]);

        let (ctx, session) = start(page, &MemoryStore::new());
        let snapshot = session.snapshot(ctx.platform());
        assert_eq!(snapshot.get("a"), Some(&true));
        assert_eq!(snapshot.get("b"), Some(&false));
    }

    #[test]
    fn test_teardown_then_reinitialize() {
        let page_markers = markers(&[("global", "true")]);
        let mut page = MemoryPage::new("/").with_page_markers(page_markers);
        page.add_cell(markers(&[("hidden", "true")]), &[("a", 1)]);

        let (ctx, session) = start(page, &MemoryStore::new());
        assert_eq!(ctx.platform().button_count(), 2);
        teardown(&ctx, session);
        let page = ctx.platform();
        assert_eq!(page.button_count(), 0);
        assert_eq!(page.live_region_count(), 0);
        // Visibility is left alone.
        assert!(page.is_hidden(&0));

        let session = initialize(&ctx);
        assert_eq!(page.button_count(), 2);
        assert_eq!(page.global_button_count(), 1);
        assert_eq!(page.live_region_count(), 1);
        assert!(session.global.is_some());
    }
}
