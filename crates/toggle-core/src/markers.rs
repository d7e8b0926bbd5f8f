//! Markup contract shared with the document preprocessing pass.
//!
//! The preprocessing pass writes these attributes and classes into the
//! rendered page; the engine only reads them (and toggles `HIDDEN_CLASS`).

/// Marks a cell container as toggleable. Any value is accepted.
pub const CELL_ATTR: &str = "data-output-toggle";

/// `"true"`/`"false"`: outputs start hidden.
pub const HIDDEN_ATTR: &str = "data-toggle-hidden";

/// `"true"`/`"false"`: every output in the cell shares one state.
pub const SYNC_ATTR: &str = "data-toggle-sync";

/// `"true"`/`"false"`: state survives reloads.
pub const PERSIST_ATTR: &str = "data-toggle-persist";

/// Custom button text.
pub const LABEL_ATTR: &str = "data-toggle-label";

/// Page-level only: `"true"`/`"false"`, add the page-wide button.
pub const GLOBAL_ATTR: &str = "data-toggle-global";

/// Page-level only: custom text for the page-wide button.
pub const GLOBAL_LABEL_ATTR: &str = "data-toggle-global-label";

/// Identifier on a code block, unique within the page.
pub const TOGGLE_ID_ATTR: &str = "data-toggle-id";

/// Back-reference from an output region to its code block's identifier.
pub const OUTPUT_ATTR: &str = "data-toggle-output";

/// Present on an output region while it is hidden.
pub const HIDDEN_CLASS: &str = "output-hidden";

/// Present on a button while its group is hidden.
pub const BUTTON_HIDDEN_CLASS: &str = "toggle-collapsed";

/// Class of every per-pair button.
pub const BUTTON_CLASS: &str = "output-toggle-button";

/// Class of the page-wide button.
pub const GLOBAL_BUTTON_CLASS: &str = "output-toggle-global";

/// Class of the live announcement region.
pub const LIVE_REGION_CLASS: &str = "output-toggle-announcer";

/// Attribute on a button naming the toggle id it controls, or `"global"`.
pub const BUTTON_TARGET_ATTR: &str = "data-toggle-target";
