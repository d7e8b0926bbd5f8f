//! Platform abstraction for the toggle engine.
//!
//! `TogglePlatform` is the interface between the engine and whatever hosts the
//! rendered page (the browser DOM, or the in-memory page used in tests). The
//! engine never touches elements directly; every read and write goes through
//! this trait.

use smol_str::SmolStr;

use crate::button::ButtonPresentation;
use crate::config::AttributeMarkers;

/// Error type for platform operations.
#[derive(Debug, Clone, thiserror::Error)]
#[error("platform error: {0}")]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// The page the engine runs against.
///
/// Handles are cheap clones referring to the same underlying node, the way
/// `web_sys::Element` does.
pub trait TogglePlatform {
    /// A toggle-marked cell container.
    type Cell: Clone;
    /// One output region of a code block.
    type Region: Clone;
    /// A toggle control.
    type Button: Clone;
    /// The live announcement element.
    type LiveRegion;

    /// Path of the current page, used to scope storage keys.
    fn page_path(&self) -> String;

    /// Page-level configuration markers.
    fn page_markers(&self) -> AttributeMarkers;

    /// Every toggle-marked cell, in document order.
    fn toggle_cells(&self) -> Vec<Self::Cell>;

    /// Configuration markers on a cell.
    fn cell_markers(&self, cell: &Self::Cell) -> AttributeMarkers;

    /// Identifiers of the code blocks in a cell, in document order.
    fn toggle_ids(&self, cell: &Self::Cell) -> Vec<SmolStr>;

    /// Output regions in `cell` that refer back to `toggle_id`.
    fn output_regions(&self, cell: &Self::Cell, toggle_id: &str) -> Vec<Self::Region>;

    /// Whether the region currently carries the hidden marker.
    fn is_hidden(&self, region: &Self::Region) -> bool;

    /// Add or remove the hidden marker.
    fn set_hidden(&self, region: &Self::Region, hidden: bool);

    /// Create a control for one code block and place it next to the block.
    fn create_button(
        &self,
        cell: &Self::Cell,
        toggle_id: &str,
        label: &str,
    ) -> Result<Self::Button, PlatformError>;

    /// Create the page-wide control.
    fn create_global_button(&self, label: &str) -> Result<Self::Button, PlatformError>;

    /// Write presentation state onto a control.
    fn apply_presentation(&self, button: &Self::Button, presentation: &ButtonPresentation);

    /// Detach a control from the page.
    fn remove_button(&self, button: &Self::Button);

    /// Create the visually hidden, polite live region.
    fn create_live_region(&self) -> Result<Self::LiveRegion, PlatformError>;

    /// Empty the live region immediately.
    fn clear_live_region(&self, region: &Self::LiveRegion);

    /// Set the live region's text on the next animation frame.
    fn announce_next_frame(&self, region: &Self::LiveRegion, message: &str);

    /// Detach the live region from the page.
    fn remove_live_region(&self, region: &Self::LiveRegion);
}
