//! toggle-core: show/hide state engine for code cell outputs.
//!
//! This crate provides:
//! - `TogglePlatform` trait for the page the engine runs on
//! - `ToggleStorage` - best-effort, page-scoped persistence over a `KeyValueStore`
//! - `Announcer` - single polite live region for state announcements
//! - Cell processing, the global toggle and the initializer, all generic over
//!   the platform
//!
//! The browser implementation lives in `toggle-browser`. An in-memory page is
//! available behind the `testing` feature.

pub mod announce;
pub mod button;
pub mod cell;
pub mod config;
pub mod context;
pub mod engine;
pub mod global;
pub mod init;
pub mod markers;
pub mod platform;
pub mod storage;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use announce::{Announcer, Announcement};
pub use button::{
    ButtonPresentation, DEFAULT_LABEL, Vocabulary, is_activation_key, update_global_state,
    update_state,
};
pub use cell::{BindingMode, CellOutcome, PairRecord, ToggleBinding, ToggleGroup, process_cell};
pub use config::{AttributeMarkers, CellConfig, ToggleDefaults, ToggleOptions, parse_flag};
pub use context::ToggleContext;
pub use engine::{all_hidden, set_hidden, toggle_all, toggle_single};
pub use global::setup_global;
pub use init::{ReadyState, ToggleSession, initialize, teardown};
pub use platform::{PlatformError, TogglePlatform};
pub use smol_str::SmolStr;
pub use storage::{KeyValueStore, StorageScope, StoreError, ToggleStorage, normalize_path};
