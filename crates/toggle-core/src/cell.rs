//! Per-cell processing: initial state, buttons and their bindings.

use std::rc::Rc;

use smol_str::SmolStr;

use crate::button;
use crate::config::CellConfig;
use crate::context::ToggleContext;
use crate::engine::set_hidden;
use crate::platform::TogglePlatform;
use crate::storage::{KeyValueStore, StorageScope};

/// Which transition a button drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// One pair, `toggle_single`.
    Single,
    /// Every pair in a synchronized cell, `toggle_all`.
    Group,
    /// Every pair on the page, `toggle_all` plus the page-wide presentation.
    Global,
}

/// Regions and buttons one action affects.
pub struct ToggleGroup<P: TogglePlatform> {
    pub regions: Rc<[P::Region]>,
    pub buttons: Rc<[P::Button]>,
}

impl<P: TogglePlatform> Clone for ToggleGroup<P> {
    fn clone(&self) -> Self {
        Self {
            regions: Rc::clone(&self.regions),
            buttons: Rc::clone(&self.buttons),
        }
    }
}

/// What one button does when activated, captured when the button is created.
pub struct ToggleBinding<P: TogglePlatform> {
    pub mode: BindingMode,
    pub button: P::Button,
    pub group: ToggleGroup<P>,
    /// `None` when persistence is off for this scope.
    pub storage_key: Option<String>,
}

impl<P: TogglePlatform> Clone for ToggleBinding<P> {
    fn clone(&self) -> Self {
        Self {
            mode: self.mode,
            button: self.button.clone(),
            group: self.group.clone(),
            storage_key: self.storage_key.clone(),
        }
    }
}

/// One code block and its output regions.
pub struct PairRecord<P: TogglePlatform> {
    pub toggle_id: SmolStr,
    pub regions: Vec<P::Region>,
}

impl<P: TogglePlatform> Clone for PairRecord<P> {
    fn clone(&self) -> Self {
        Self {
            toggle_id: self.toggle_id.clone(),
            regions: self.regions.clone(),
        }
    }
}

/// Everything a processed cell contributed to the page.
pub struct CellOutcome<P: TogglePlatform> {
    pub bindings: Vec<ToggleBinding<P>>,
    pub pairs: Vec<PairRecord<P>>,
}

impl<P: TogglePlatform> CellOutcome<P> {
    /// Every region with a button, in document order.
    pub fn regions(&self) -> impl Iterator<Item = &P::Region> {
        self.pairs.iter().flat_map(|pair| pair.regions.iter())
    }
}

/// Process one toggle-marked cell.
///
/// Initial state per pair is the cell's resolved default, overridden by a
/// persisted value when the cell persists: the cell-level key in sync mode,
/// the pair-level key otherwise. State is applied to regions before any
/// binding exists. Pairs with no output regions, or whose button cannot be
/// created, are left untouched.
pub fn process_cell<P, S>(ctx: &ToggleContext<P, S>, cell: &P::Cell, index: usize) -> CellOutcome<P>
where
    P: TogglePlatform,
    S: KeyValueStore,
{
    let platform = ctx.platform();
    let storage = ctx.storage();
    let config = CellConfig::resolve(ctx.defaults(), &platform.cell_markers(cell));

    let cell_key = (config.sync && config.persist)
        .then(|| storage.create_key(&StorageScope::Cell(index)));
    let cell_hidden = cell_key
        .as_deref()
        .and_then(|key| storage.load(key))
        .unwrap_or(config.hidden);

    let mut outcome = CellOutcome {
        bindings: Vec::new(),
        pairs: Vec::new(),
    };
    let mut buttons = Vec::new();

    for toggle_id in platform.toggle_ids(cell) {
        let regions = platform.output_regions(cell, &toggle_id);
        if regions.is_empty() {
            tracing::debug!(cell = index, %toggle_id, "no output regions, skipping");
            continue;
        }

        let pair_key = (!config.sync && config.persist)
            .then(|| storage.create_key(&StorageScope::Pair(toggle_id.clone())));
        let hidden = if config.sync {
            cell_hidden
        } else {
            pair_key
                .as_deref()
                .and_then(|key| storage.load(key))
                .unwrap_or(config.hidden)
        };

        let button = match button::create(platform, cell, &toggle_id, &config.label, hidden) {
            Ok(button) => button,
            Err(e) => {
                tracing::warn!(cell = index, %toggle_id, error = %e, "could not create toggle button");
                continue;
            }
        };
        set_hidden(platform, &regions, hidden);

        if !config.sync {
            outcome.bindings.push(ToggleBinding {
                mode: BindingMode::Single,
                button: button.clone(),
                group: ToggleGroup {
                    regions: regions.iter().cloned().collect(),
                    buttons: Rc::from(vec![button]),
                },
                storage_key: pair_key,
            });
        } else {
            buttons.push(button);
        }
        outcome.pairs.push(PairRecord { toggle_id, regions });
    }

    if config.sync && !buttons.is_empty() {
        let group = ToggleGroup::<P> {
            regions: outcome.regions().cloned().collect(),
            buttons: Rc::from(buttons),
        };
        outcome.bindings = group
            .buttons
            .iter()
            .map(|button| ToggleBinding {
                mode: BindingMode::Group,
                button: button.clone(),
                group: group.clone(),
                storage_key: cell_key.clone(),
            })
            .collect();
    }

    tracing::debug!(
        cell = index,
        sync = config.sync,
        persist = config.persist,
        pairs = outcome.pairs.len(),
        "processed toggle cell"
    );
    outcome
}
