//! In-memory page and store for exercising the engine without a browser.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::button::ButtonPresentation;
use crate::config::AttributeMarkers;
use crate::platform::{PlatformError, TogglePlatform};
use crate::storage::{KeyValueStore, StoreError};

/// Build markers from `(name, value)` pairs.
///
/// Names are `hidden`, `sync`, `persist`, `global`, `label` and `global_label`.
pub fn markers(values: &[(&str, &str)]) -> AttributeMarkers {
    let mut markers = AttributeMarkers::default();
    for (name, value) in values {
        let value = Some(value.to_string());
        match *name {
            "hidden" => markers.hidden = value,
            "sync" => markers.sync = value,
            "persist" => markers.persist = value,
            "global" => markers.global = value,
            "label" => markers.label = value,
            "global_label" => markers.global_label = value,
            other => panic!("unknown marker {other}"),
        }
    }
    markers
}

#[derive(Debug, Clone)]
struct MemoryCell {
    markers: AttributeMarkers,
    /// Toggle id and the indices of its regions.
    blocks: Vec<(SmolStr, Vec<usize>)>,
}

/// A control created on the page.
#[derive(Debug, Clone)]
pub struct MemoryButton {
    /// Toggle id, `None` for the page-wide button.
    pub target: Option<SmolStr>,
    pub label: String,
    pub presentation: Option<ButtonPresentation>,
    /// Number of presentation writes.
    pub writes: usize,
    pub removed: bool,
}

#[derive(Debug, Default)]
struct LiveRegion {
    text: String,
    removed: bool,
}

#[derive(Debug, Default)]
struct PageState {
    hidden: Vec<bool>,
    buttons: Vec<MemoryButton>,
    live_regions: Vec<LiveRegion>,
    frame_queue: Vec<(usize, String)>,
}

/// A rendered page held in memory. Regions, buttons and live regions are
/// plain indices.
#[derive(Debug)]
pub struct MemoryPage {
    path: String,
    page_markers: AttributeMarkers,
    cells: Vec<MemoryCell>,
    failing_buttons: Vec<SmolStr>,
    state: RefCell<PageState>,
}

impl MemoryPage {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            page_markers: AttributeMarkers::default(),
            cells: Vec::new(),
            failing_buttons: Vec::new(),
            state: RefCell::new(PageState::default()),
        }
    }

    pub fn with_page_markers(mut self, markers: AttributeMarkers) -> Self {
        self.page_markers = markers;
        self
    }

    /// Add a toggle-marked cell with `(toggle id, region count)` blocks.
    /// Returns the cell handle.
    pub fn add_cell(&mut self, markers: AttributeMarkers, blocks: &[(&str, usize)]) -> usize {
        let mut state = self.state.borrow_mut();
        let blocks = blocks
            .iter()
            .map(|(id, count)| {
                let start = state.hidden.len();
                state.hidden.extend(std::iter::repeat_n(false, *count));
                (SmolStr::new(id), (start..start + count).collect())
            })
            .collect();
        self.cells.push(MemoryCell { markers, blocks });
        self.cells.len() - 1
    }

    /// Make button creation fail for one toggle id.
    pub fn fail_button_for(&mut self, toggle_id: &str) {
        self.failing_buttons.push(SmolStr::new(toggle_id));
    }

    /// The same page freshly loaded: same structure, nothing hidden, no
    /// buttons, no live region.
    pub fn reload(&self) -> Self {
        let hidden = vec![false; self.state.borrow().hidden.len()];
        Self {
            path: self.path.clone(),
            page_markers: self.page_markers.clone(),
            cells: self.cells.clone(),
            failing_buttons: self.failing_buttons.clone(),
            state: RefCell::new(PageState {
                hidden,
                ..Default::default()
            }),
        }
    }

    /// Regions belonging to a toggle id.
    pub fn regions_for(&self, toggle_id: &str) -> Vec<usize> {
        self.cells
            .iter()
            .flat_map(|cell| cell.blocks.iter())
            .filter(|(id, _)| id == toggle_id)
            .flat_map(|(_, regions)| regions.iter().copied())
            .collect()
    }

    /// Every region in a cell, in document order.
    pub fn regions_in(&self, cell: &usize) -> Vec<usize> {
        self.cells[*cell]
            .blocks
            .iter()
            .flat_map(|(_, regions)| regions.iter().copied())
            .collect()
    }

    /// Every region on the page.
    pub fn all_regions(&self) -> Vec<usize> {
        (0..self.state.borrow().hidden.len()).collect()
    }

    pub fn button(&self, button: usize) -> MemoryButton {
        self.state.borrow().buttons[button].clone()
    }

    pub fn presentation(&self, button: usize) -> Option<ButtonPresentation> {
        self.state.borrow().buttons[button].presentation.clone()
    }

    /// Visible text of a button.
    pub fn button_label(&self, button: usize) -> String {
        let state = self.state.borrow();
        let button = &state.buttons[button];
        button
            .presentation
            .as_ref()
            .and_then(|p| p.text.clone())
            .unwrap_or_else(|| button.label.clone())
    }

    /// Buttons still attached to the page.
    pub fn button_count(&self) -> usize {
        self.state
            .borrow()
            .buttons
            .iter()
            .filter(|b| !b.removed)
            .count()
    }

    /// Page-wide buttons still attached to the page.
    pub fn global_button_count(&self) -> usize {
        self.state
            .borrow()
            .buttons
            .iter()
            .filter(|b| !b.removed && b.target.is_none())
            .count()
    }

    pub fn live_region_count(&self) -> usize {
        self.state
            .borrow()
            .live_regions
            .iter()
            .filter(|r| !r.removed)
            .count()
    }

    /// Text of the attached live region, if there is one.
    pub fn live_text(&self) -> Option<String> {
        self.state
            .borrow()
            .live_regions
            .iter()
            .find(|r| !r.removed)
            .map(|r| r.text.clone())
    }

    /// Run queued animation frame callbacks.
    pub fn run_frame(&self) {
        let mut state = self.state.borrow_mut();
        let queue = std::mem::take(&mut state.frame_queue);
        for (region, message) in queue {
            state.live_regions[region].text = message;
        }
    }

    fn push_button(&self, target: Option<SmolStr>, label: &str) -> usize {
        let mut state = self.state.borrow_mut();
        state.buttons.push(MemoryButton {
            target,
            label: label.to_string(),
            presentation: None,
            writes: 0,
            removed: false,
        });
        state.buttons.len() - 1
    }
}

impl TogglePlatform for MemoryPage {
    type Cell = usize;
    type Region = usize;
    type Button = usize;
    type LiveRegion = usize;

    fn page_path(&self) -> String {
        self.path.clone()
    }

    fn page_markers(&self) -> AttributeMarkers {
        self.page_markers.clone()
    }

    fn toggle_cells(&self) -> Vec<usize> {
        (0..self.cells.len()).collect()
    }

    fn cell_markers(&self, cell: &usize) -> AttributeMarkers {
        self.cells[*cell].markers.clone()
    }

    fn toggle_ids(&self, cell: &usize) -> Vec<SmolStr> {
        self.cells[*cell]
            .blocks
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn output_regions(&self, cell: &usize, toggle_id: &str) -> Vec<usize> {
        self.cells[*cell]
            .blocks
            .iter()
            .filter(|(id, _)| id == toggle_id)
            .flat_map(|(_, regions)| regions.iter().copied())
            .collect()
    }

    fn is_hidden(&self, region: &usize) -> bool {
        self.state.borrow().hidden[*region]
    }

    fn set_hidden(&self, region: &usize, hidden: bool) {
        self.state.borrow_mut().hidden[*region] = hidden;
    }

    fn create_button(
        &self,
        _cell: &usize,
        toggle_id: &str,
        label: &str,
    ) -> Result<usize, PlatformError> {
        if self.failing_buttons.iter().any(|id| id == toggle_id) {
            return Err(PlatformError::from("button creation refused"));
        }
        Ok(self.push_button(Some(SmolStr::new(toggle_id)), label))
    }

    fn create_global_button(&self, label: &str) -> Result<usize, PlatformError> {
        Ok(self.push_button(None, label))
    }

    fn apply_presentation(&self, button: &usize, presentation: &ButtonPresentation) {
        let mut state = self.state.borrow_mut();
        let button = &mut state.buttons[*button];
        button.presentation = Some(presentation.clone());
        button.writes += 1;
    }

    fn remove_button(&self, button: &usize) {
        self.state.borrow_mut().buttons[*button].removed = true;
    }

    fn create_live_region(&self) -> Result<usize, PlatformError> {
        let mut state = self.state.borrow_mut();
        state.live_regions.push(LiveRegion::default());
        Ok(state.live_regions.len() - 1)
    }

    fn clear_live_region(&self, region: &usize) {
        self.state.borrow_mut().live_regions[*region].text.clear();
    }

    fn announce_next_frame(&self, region: &usize, message: &str) {
        self.state
            .borrow_mut()
            .frame_queue
            .push((*region, message.to_string()));
    }

    fn remove_live_region(&self, region: &usize) {
        self.state.borrow_mut().live_regions[*region].removed = true;
    }
}

/// Shared in-memory key/value store. Clones see the same entries, which lets a
/// test "reload" a page against the storage a previous session wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    failing: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails.
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.get() {
            Err(StoreError::Unavailable("memory store disabled".into()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.get(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.insert(key, value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
