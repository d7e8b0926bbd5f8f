//! WASM entry point for output toggles.
//!
//! Loaded as a module script by rendered documents. On start it installs the
//! panic hook and logging, then initializes toggles from the page's own
//! markers once the document is ready.
//!
//! Exposed to JS:
//! - `initToggles(options?)` - (re)initialize with extra document defaults
//! - `teardownToggles()` - remove every control this module created
//! - `toggleState()` - hidden state per toggle id

use std::cell::RefCell;

use gloo_events::EventListener;
use serde::Serialize;
use toggle_browser::{BrowserSession, ToggleOptions, when_ready};
use wasm_bindgen::prelude::*;

thread_local! {
    /// The running session, if initialization has happened.
    static ACTIVE: RefCell<Option<BrowserSession>> = const { RefCell::new(None) };
    /// Ready listener for an initialization still waiting on `DOMContentLoaded`.
    static PENDING: RefCell<Option<EventListener>> = const { RefCell::new(None) };
}

/// Set up panic reporting and logging, then schedule initialization.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    init_tracing();
    schedule(ToggleOptions::default());
}

fn init_tracing() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let reg = Registry::default().with(wasm_layer);

    let _ = set_global_default(reg);
}

/// Replace any running session with a fresh one once the document is ready.
fn schedule(options: ToggleOptions) {
    // A newer request supersedes one still waiting for the ready event.
    PENDING.with(|pending| pending.borrow_mut().take());

    let listener = when_ready(move || replace_session(options));
    PENDING.with(|pending| *pending.borrow_mut() = listener);
}

fn replace_session(options: ToggleOptions) {
    let previous = ACTIVE.with(|active| active.borrow_mut().take());
    if let Some(previous) = previous {
        previous.teardown();
    }

    match BrowserSession::start(options) {
        Ok(session) => ACTIVE.with(|active| *active.borrow_mut() = Some(session)),
        Err(e) => tracing::warn!(error = %e, "output toggles not initialized"),
    }
}

/// Re-initialize toggles with `options` layered over the page markers.
///
/// `options` may be `undefined`, or an object with any of `hidden`, `sync`,
/// `persist`, `global`, `label`, `globalLabel` and `namespace`. Cell markers
/// still override options.
#[wasm_bindgen(js_name = initToggles)]
pub fn init_toggles(options: JsValue) -> Result<(), JsError> {
    let options: ToggleOptions = if options.is_undefined() || options.is_null() {
        ToggleOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsError::new(&format!("Invalid toggle options: {}", e)))?
    };
    schedule(options);
    Ok(())
}

/// Remove every control and the live region. Output visibility is kept.
#[wasm_bindgen(js_name = teardownToggles)]
pub fn teardown_toggles() {
    PENDING.with(|pending| pending.borrow_mut().take());
    let active = ACTIVE.with(|active| active.borrow_mut().take());
    if let Some(session) = active {
        session.teardown();
    }
}

/// Hidden state per toggle id, e.g. `{ "cell-1": true }`.
#[wasm_bindgen(js_name = toggleState)]
pub fn toggle_state() -> Result<JsValue, JsError> {
    let snapshot = ACTIVE.with(|active| {
        active
            .borrow()
            .as_ref()
            .map(BrowserSession::snapshot)
            .unwrap_or_default()
    });
    snapshot
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("Could not serialize toggle state: {}", e)))
}
