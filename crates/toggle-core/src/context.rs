//! Shared state for one toggle session.

use crate::announce::{Announcement, Announcer};
use crate::button::update_global_state;
use crate::cell::{BindingMode, ToggleBinding};
use crate::config::{ToggleDefaults, ToggleOptions};
use crate::engine::{all_hidden, toggle_all, toggle_single};
use crate::platform::TogglePlatform;
use crate::storage::{KeyValueStore, ToggleStorage};

/// Everything the engine components share: the page, persistence, the
/// announcer and the resolved document configuration.
///
/// Created by the caller before [`initialize`](crate::initialize) and passed by
/// reference to every component.
pub struct ToggleContext<P: TogglePlatform, S> {
    platform: P,
    storage: ToggleStorage<S>,
    announcer: Announcer<P::LiveRegion>,
    defaults: ToggleDefaults,
}

impl<P: TogglePlatform, S: KeyValueStore> ToggleContext<P, S> {
    /// Create a context, resolving document configuration from the built-in
    /// defaults, then the page markers, then `options`.
    pub fn new(platform: P, store: S, options: ToggleOptions) -> Self {
        let defaults = ToggleDefaults::default()
            .merge(&platform.page_markers().to_options())
            .merge(&options);
        Self::with_resolved(platform, store, defaults)
    }

    /// Create a context from already resolved defaults; page markers are not read.
    pub fn with_resolved(platform: P, store: S, defaults: ToggleDefaults) -> Self {
        let storage = ToggleStorage::new(store, &defaults.namespace, &platform.page_path());
        Self {
            platform,
            storage,
            announcer: Announcer::new(),
            defaults,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn storage(&self) -> &ToggleStorage<S> {
        &self.storage
    }

    pub fn announcer(&self) -> &Announcer<P::LiveRegion> {
        &self.announcer
    }

    pub fn defaults(&self) -> &ToggleDefaults {
        &self.defaults
    }

    pub(crate) fn announce(&self, announcement: Announcement) {
        self.announcer.announce(&self.platform, announcement);
    }

    /// Run the action a button is bound to. Returns the new hidden state.
    ///
    /// `global` is the page-wide binding, if any. After a per-pair or per-cell
    /// action its presentation is recomputed from the regions so it keeps
    /// describing the page.
    pub fn activate(&self, binding: &ToggleBinding<P>, global: Option<&ToggleBinding<P>>) -> bool {
        let key = binding.storage_key.as_deref();
        let group = &binding.group;
        let hidden = match binding.mode {
            BindingMode::Single => toggle_single(self, &group.regions, &binding.button, key),
            BindingMode::Group => toggle_all(self, &group.regions, &group.buttons, key),
            BindingMode::Global => {
                let hidden = toggle_all(self, &group.regions, &group.buttons, key);
                update_global_state(
                    &self.platform,
                    &binding.button,
                    hidden,
                    self.defaults.global_label.as_deref(),
                );
                return hidden;
            }
        };
        if let Some(global) = global {
            update_global_state(
                &self.platform,
                &global.button,
                all_hidden(&self.platform, &global.group.regions),
                self.defaults.global_label.as_deref(),
            );
        }
        hidden
    }
}
