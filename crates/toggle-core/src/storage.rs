//! Best-effort, page-scoped persistence of toggle state.
//!
//! ## Key strategy
//!
//! Every key is `"{namespace}-{normalized page path}-{scope}"`, where scope is
//! `cell-{index}`, `pair-{toggle id}` or `global`. The normalized path never
//! contains `-`, so the first dash after the namespace always ends the path and
//! the rest is the scope. The same page always maps to the same keys and
//! different pages never collide. Stale keys are never deleted; they are
//! harmless.
//!
//! ## Failure model
//!
//! The backing store is probed once. A failed probe (storage disabled, private
//! mode, quota policy) turns every later `save`/`load` into a no-op. Individual
//! failures after a good probe are logged and swallowed. Nothing here returns
//! an error to callers.

use std::cell::OnceCell;
use std::fmt;

use smol_str::SmolStr;

/// Key written and removed by the availability probe.
const PROBE_SUFFIX: &str = "__probe__";

/// Error from a key/value backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store does not exist or refuses access.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The store rejected a write for lack of space.
    #[error("storage quota exceeded")]
    Quota,

    /// Value could not be encoded or decoded.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    /// Anything else the backend reported.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A string key/value store, such as the browser's `localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

/// What a persisted flag belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageScope {
    /// A whole synchronized cell, by zero-based cell index.
    Cell(usize),
    /// One code block, by toggle id.
    Pair(SmolStr),
    /// The page-wide button.
    Global,
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageScope::Cell(index) => write!(f, "cell-{}", index),
            StorageScope::Pair(id) => write!(f, "pair-{}", id),
            StorageScope::Global => f.write_str("global"),
        }
    }
}

/// Map a page path into a dash-free key segment.
///
/// `/` becomes `_`. Characters that would make the mapping ambiguous (`%`,
/// `_`, `-` and `\`) are percent-encoded first, so distinct paths stay
/// distinct.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '/' => normalized.push('_'),
            '%' => normalized.push_str("%25"),
            '-' => normalized.push_str("%2D"),
            '\\' => normalized.push_str("%5C"),
            '_' => normalized.push_str("%5F"),
            c => normalized.push(c),
        }
    }
    normalized
}

/// Page-scoped persistence over a [`KeyValueStore`].
pub struct ToggleStorage<S> {
    store: S,
    prefix: String,
    available: OnceCell<bool>,
}

impl<S: KeyValueStore> ToggleStorage<S> {
    /// Create storage for the page at `page_path`.
    pub fn new(store: S, namespace: &str, page_path: &str) -> Self {
        Self {
            store,
            prefix: format!("{}-{}", namespace, normalize_path(page_path)),
            available: OnceCell::new(),
        }
    }

    /// Whether the store can be used. Probed once, then cached.
    pub fn is_available(&self) -> bool {
        *self.available.get_or_init(|| match self.probe() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "toggle persistence disabled");
                false
            }
        })
    }

    fn probe(&self) -> Result<(), StoreError> {
        let key = format!("{}-{}", self.prefix, PROBE_SUFFIX);
        self.store.set_item(&key, "1")?;
        self.store.remove_item(&key)
    }

    /// Storage key for a scope on this page.
    pub fn create_key(&self, scope: &StorageScope) -> String {
        format!("{}-{}", self.prefix, scope)
    }

    /// Store a flag. Failures are logged and dropped.
    pub fn save(&self, key: &str, hidden: bool) {
        if !self.is_available() {
            return;
        }
        let result = serde_json::to_string(&hidden)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set_item(key, &json));
        if let Err(e) = result {
            tracing::debug!(key, error = %e, "failed to persist toggle state");
        }
    }

    /// Load a flag. Missing, malformed or mistyped data is `None`.
    pub fn load(&self, key: &str) -> Option<bool> {
        if !self.is_available() {
            return None;
        }
        let json = match self.store.get_item(key) {
            Ok(json) => json?,
            Err(e) => {
                tracing::debug!(key, error = %e, "failed to read toggle state");
                return None;
            }
        };
        serde_json::from_str::<bool>(&json).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn storage(store: MemoryStore) -> ToggleStorage<MemoryStore> {
        ToggleStorage::new(store, "output-toggle", "/guide/intro.html")
    }

    #[test]
    fn test_key_shape() {
        let storage = storage(MemoryStore::new());
        assert_eq!(
            storage.create_key(&StorageScope::Cell(0)),
            "output-toggle-_guide_intro.html-cell-0"
        );
        assert_eq!(
            storage.create_key(&StorageScope::Pair("fig-1".into())),
            "output-toggle-_guide_intro.html-pair-fig-1"
        );
        assert_eq!(
            storage.create_key(&StorageScope::Global),
            "output-toggle-_guide_intro.html-global"
        );
    }

    #[test]
    fn test_pages_do_not_collide() {
        let a = ToggleStorage::new(MemoryStore::new(), "ns", "/a/index.html");
        let b = ToggleStorage::new(MemoryStore::new(), "ns", "/b/index.html");
        assert_ne!(
            a.create_key(&StorageScope::Global),
            b.create_key(&StorageScope::Global)
        );
    }

    #[test]
    fn test_separator_lookalikes_do_not_collide() {
        let store = MemoryStore::new();
        let underscore = ToggleStorage::new(store.clone(), "output-toggle", "/a_b.html");
        let nested = ToggleStorage::new(store.clone(), "output-toggle", "/a/b.html");
        let cell = StorageScope::Cell(0);
        assert_ne!(underscore.create_key(&cell), nested.create_key(&cell));

        underscore.save(&underscore.create_key(&cell), true);
        assert_eq!(nested.load(&nested.create_key(&cell)), None);

        let dashed = ToggleStorage::new(MemoryStore::new(), "ns", "/x-pair-y");
        let plain = ToggleStorage::new(MemoryStore::new(), "ns", "/x");
        assert_ne!(
            dashed.create_key(&StorageScope::Global),
            plain.create_key(&StorageScope::Pair("y-global".into()))
        );

        let backslash = ToggleStorage::new(MemoryStore::new(), "ns", "\\a");
        let slash = ToggleStorage::new(MemoryStore::new(), "ns", "/a");
        assert_ne!(
            backslash.create_key(&StorageScope::Global),
            slash.create_key(&StorageScope::Global)
        );
    }

    #[test]
    fn test_normalized_path_has_no_dash() {
        assert_eq!(normalize_path("/guide/intro.html"), "_guide_intro.html");
        assert_eq!(normalize_path("/a_b-c%d"), "_a%5Fb%2Dc%25d");
        assert!(!normalize_path("/x-pair-y/").contains('-'));
    }

    #[test]
    fn test_round_trip() {
        let storage = storage(MemoryStore::new());
        let key = storage.create_key(&StorageScope::Cell(3));

        storage.save(&key, true);
        assert_eq!(storage.load(&key), Some(true));
        storage.save(&key, false);
        assert_eq!(storage.load(&key), Some(false));
    }

    #[test]
    fn test_never_saved_is_absent() {
        let storage = storage(MemoryStore::new());
        assert_eq!(storage.load("output-toggle-nothing-here"), None);
    }

    #[test]
    fn test_malformed_is_absent() {
        let store = MemoryStore::new();
        store.insert("k-garbage", "{not json");
        store.insert("k-number", "1");
        store.insert("k-string", "\"true\"");
        let storage = storage(store);

        assert_eq!(storage.load("k-garbage"), None);
        assert_eq!(storage.load("k-number"), None);
        assert_eq!(storage.load("k-string"), None);
    }

    #[test]
    fn test_probe_cleans_up() {
        let store = MemoryStore::new();
        let storage = storage(store.clone());
        assert!(storage.is_available());
        assert!(store.is_empty());
    }

    #[test]
    fn test_unavailable_store_is_noop() {
        let store = MemoryStore::unavailable();
        let storage = storage(store.clone());

        assert!(!storage.is_available());
        storage.save("key", true);
        assert_eq!(storage.load("key"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_probe_result_is_cached() {
        let store = MemoryStore::unavailable();
        let storage = storage(store.clone());
        assert!(!storage.is_available());

        // Recovering later does not re-enable persistence.
        store.set_failing(false);
        assert!(!storage.is_available());
        storage.save("key", true);
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_failure_swallowed() {
        let store = MemoryStore::new();
        let storage = storage(store.clone());
        assert!(storage.is_available());

        store.set_failing(true);
        storage.save("key", true);
        assert_eq!(storage.load("key"), None);
    }
}
