//! Toggle state transitions.
//!
//! All regions in a group share one state. Transitions apply to the whole group
//! and every bound button within one call, so no partially updated group is
//! ever observable.

use crate::announce::Announcement;
use crate::button::update_state;
use crate::context::ToggleContext;
use crate::platform::TogglePlatform;
use crate::storage::KeyValueStore;

/// Apply `hidden` to every region in the group.
pub fn set_hidden<P: TogglePlatform>(platform: &P, regions: &[P::Region], hidden: bool) {
    for region in regions {
        platform.set_hidden(region, hidden);
    }
}

/// True iff every region is hidden. Stops at the first visible region.
///
/// An empty group is not "all hidden".
pub fn all_hidden<P: TogglePlatform>(platform: &P, regions: &[P::Region]) -> bool {
    !regions.is_empty() && regions.iter().all(|region| platform.is_hidden(region))
}

/// Flip one pair's group. Returns the new hidden state.
///
/// The first region is authoritative for the current state.
pub fn toggle_single<P, S>(
    ctx: &ToggleContext<P, S>,
    regions: &[P::Region],
    button: &P::Button,
    storage_key: Option<&str>,
) -> bool
where
    P: TogglePlatform,
    S: KeyValueStore,
{
    let platform = ctx.platform();
    let Some(first) = regions.first() else {
        return false;
    };
    let hidden = !platform.is_hidden(first);

    set_hidden(platform, regions, hidden);
    update_state(platform, button, hidden);
    ctx.announce(Announcement::single(hidden));
    if let Some(key) = storage_key {
        ctx.storage().save(key, hidden);
    }

    tracing::trace!(hidden, regions = regions.len(), "toggled output");
    hidden
}

/// Flip a multi-pair group. Returns the new hidden state.
///
/// A group with any visible region counts as "not all hidden", so a mixed group
/// always ends up fully hidden.
pub fn toggle_all<P, S>(
    ctx: &ToggleContext<P, S>,
    regions: &[P::Region],
    buttons: &[P::Button],
    storage_key: Option<&str>,
) -> bool
where
    P: TogglePlatform,
    S: KeyValueStore,
{
    let platform = ctx.platform();
    let hidden = !all_hidden(platform, regions);

    set_hidden(platform, regions, hidden);
    for button in buttons {
        update_state(platform, button, hidden);
    }
    ctx.announce(Announcement::plural(hidden));
    if let Some(key) = storage_key {
        ctx.storage().save(key, hidden);
    }

    tracing::trace!(
        hidden,
        regions = regions.len(),
        buttons = buttons.len(),
        "toggled output group"
    );
    hidden
}
