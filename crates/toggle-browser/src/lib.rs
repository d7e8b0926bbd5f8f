//! Browser DOM layer for output toggles.
//!
//! This crate implements `toggle-core`'s platform traits on top of `web-sys`.
//! It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `page`: `BrowserPage`, the DOM implementation of `TogglePlatform`
//! - `storage`: `LocalStore`, `localStorage` behind `KeyValueStore`
//! - `events`: click and keyboard activation listeners
//! - `session`: ready-state scheduling and the listener-owning session
//!
//! # Re-exports
//!
//! This crate re-exports `toggle-core` for convenience, so consumers only need
//! to depend on `toggle-browser`.

// Re-export core crate
pub use toggle_core;
pub use toggle_core::*;

pub mod events;
pub mod page;
pub mod session;
pub mod storage;

pub use page::BrowserPage;
pub use session::{BrowserSession, when_ready};
pub use storage::LocalStore;

/// Best-effort text for a thrown JS value.
pub(crate) fn js_message(value: &wasm_bindgen::JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
