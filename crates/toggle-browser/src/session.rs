//! A running toggle session in the browser.

use std::collections::BTreeMap;
use std::rc::Rc;

use gloo_events::EventListener;
use toggle_core::{
    KeyValueStore, PlatformError, ReadyState, ToggleContext, ToggleOptions, ToggleSession,
    initialize, teardown,
};

use crate::events::bind;
use crate::page::BrowserPage;
use crate::storage::LocalStore;

/// Initialized toggles plus the listeners that drive them.
///
/// Listeners hold the context, not the other way around, so dropping the
/// session detaches everything without leaking.
pub struct BrowserSession<S: KeyValueStore + 'static = LocalStore> {
    ctx: Rc<ToggleContext<BrowserPage, S>>,
    session: ToggleSession<BrowserPage>,
    listeners: Vec<EventListener>,
}

impl BrowserSession<LocalStore> {
    /// Initialize toggles on the current page, persisting to `localStorage`.
    ///
    /// `options` override the page's own markers; cell markers override both.
    pub fn start(options: ToggleOptions) -> Result<Self, PlatformError> {
        let page = BrowserPage::current()?;
        Ok(Self::start_with(page, LocalStore::new(), options))
    }
}

impl<S: KeyValueStore + 'static> BrowserSession<S> {
    /// Initialize toggles on `page` against an arbitrary store.
    pub fn start_with(page: BrowserPage, store: S, options: ToggleOptions) -> Self {
        let ctx = Rc::new(ToggleContext::new(page, store, options));
        let session = initialize(&ctx);

        let mut listeners = Vec::with_capacity(2 * (session.bindings.len() + 1));
        let global = session.global.as_ref();
        for binding in &session.bindings {
            listeners.extend(bind(&ctx, binding, global));
        }
        if let Some(global) = global {
            listeners.extend(bind(&ctx, global, None));
        }

        Self {
            ctx,
            session,
            listeners,
        }
    }

    /// Current hidden state per toggle id.
    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        self.session.snapshot(self.ctx.platform())
    }

    /// Detach listeners and remove created buttons and the live region.
    pub fn teardown(self) {
        let Self {
            ctx,
            session,
            listeners,
        } = self;
        drop(listeners);
        teardown(&ctx, session);
        tracing::debug!("output toggles torn down");
    }
}

/// Run `f` once the document structure is ready.
///
/// If the document is still loading, `f` runs on `DOMContentLoaded` and the
/// returned listener must be kept alive until then; dropping it cancels the
/// call. Otherwise `f` runs immediately and `None` is returned. Never both.
pub fn when_ready<F>(f: F) -> Option<EventListener>
where
    F: FnOnce() + 'static,
{
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        tracing::warn!("no document, toggles not initialized");
        return None;
    };
    if ReadyState::parse(&document.ready_state()).must_defer() {
        Some(EventListener::once(&document, "DOMContentLoaded", move |_event| f()))
    } else {
        f();
        None
    }
}
