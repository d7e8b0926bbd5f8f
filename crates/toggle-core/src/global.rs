//! The page-wide toggle.

use std::rc::Rc;

use crate::button::{Vocabulary, update_global_state, update_state};
use crate::cell::{BindingMode, ToggleBinding, ToggleGroup};
use crate::context::ToggleContext;
use crate::engine::{all_hidden, set_hidden};
use crate::platform::TogglePlatform;
use crate::storage::{KeyValueStore, StorageScope};

/// Create the page-wide button over every region and button the cell
/// processors produced.
///
/// Returns `None` when the page does not ask for one or there is nothing to
/// toggle. With persistence on, a stored page-wide state is applied to every
/// region and button at load, taking precedence over cell-level state.
pub fn setup_global<P, S>(
    ctx: &ToggleContext<P, S>,
    regions: &[P::Region],
    buttons: &[P::Button],
) -> Option<ToggleBinding<P>>
where
    P: TogglePlatform,
    S: KeyValueStore,
{
    let defaults = ctx.defaults();
    if !defaults.global || regions.is_empty() {
        return None;
    }
    let platform = ctx.platform();
    let custom_label = defaults.global_label.as_deref();

    let storage_key = defaults
        .persist
        .then(|| ctx.storage().create_key(&StorageScope::Global));
    let restored = storage_key.as_deref().and_then(|key| ctx.storage().load(key));

    let hidden = restored.unwrap_or_else(|| all_hidden(platform, regions));

    let initial_label = custom_label.unwrap_or(Vocabulary::Global.action(hidden));
    let button = match platform.create_global_button(initial_label) {
        Ok(button) => button,
        Err(e) => {
            tracing::warn!(error = %e, "could not create global toggle button");
            return None;
        }
    };
    if restored.is_some() {
        set_hidden(platform, regions, hidden);
        for pair_button in buttons {
            update_state(platform, pair_button, hidden);
        }
    }
    update_global_state(platform, &button, hidden, custom_label);

    tracing::debug!(
        regions = regions.len(),
        buttons = buttons.len(),
        restored = restored.is_some(),
        "global toggle ready"
    );

    Some(ToggleBinding {
        mode: BindingMode::Global,
        button,
        group: ToggleGroup {
            regions: Rc::from(regions),
            buttons: Rc::from(buttons),
        },
        storage_key,
    })
}
