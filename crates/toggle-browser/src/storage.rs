//! `localStorage` behind `KeyValueStore`.
//!
//! `window.localStorage` itself can throw (sandboxed iframes, some private
//! modes), so every call resolves the storage object fallibly instead of
//! assuming it exists. `ToggleStorage` probes once and stops calling after a
//! failure.

use toggle_core::{KeyValueStore, StoreError};
use wasm_bindgen::JsValue;

use crate::js_message;

/// The browser's `localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        Self
    }

    fn raw(&self) -> Result<web_sys::Storage, StoreError> {
        let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
        window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(js_message(&e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage is null".into()))
    }
}

fn classify(error: JsValue) -> StoreError {
    let name = js_sys::Reflect::get(&error, &"name".into())
        .ok()
        .and_then(|name| name.as_string());
    match name.as_deref() {
        Some("QuotaExceededError") | Some("NS_ERROR_DOM_QUOTA_REACHED") => StoreError::Quota,
        Some("SecurityError") => StoreError::Unavailable(js_message(&error)),
        _ => StoreError::Backend(js_message(&error)),
    }
}

impl KeyValueStore for LocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.raw()?.get_item(key).map_err(classify)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.raw()?.set_item(key, value).map_err(classify)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.raw()?.remove_item(key).map_err(classify)
    }
}
