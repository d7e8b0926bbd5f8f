//! Button presentation.
//!
//! [`update_state`] and [`update_global_state`] are the only writers of button
//! presentation. Every state change in the engine goes through them, so a
//! button can never disagree with the regions it controls.

use crate::platform::TogglePlatform;

/// Text of a per-pair button when no label is configured.
pub const DEFAULT_LABEL: &str = "Output";

/// Which fixed wording a button uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// Per-pair and per-cell buttons.
    Pair,
    /// The page-wide button.
    Global,
}

impl Vocabulary {
    /// Wording for the action the button will perform.
    pub fn action(self, hidden: bool) -> &'static str {
        match (self, hidden) {
            (Vocabulary::Pair, true) => "Show output",
            (Vocabulary::Pair, false) => "Hide output",
            (Vocabulary::Global, true) => "Show all outputs",
            (Vocabulary::Global, false) => "Hide all outputs",
        }
    }
}

/// Everything a platform writes onto a button for a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonPresentation {
    /// Toggles the collapsed presentation class.
    pub hidden: bool,
    /// `aria-expanded`; true while the outputs are visible.
    pub expanded: bool,
    /// `title`, and the action half of the accessible name.
    pub tooltip: String,
    /// Replacement button text. `None` leaves the text alone.
    pub text: Option<String>,
}

impl ButtonPresentation {
    /// Presentation of a per-pair button.
    pub fn pair(hidden: bool) -> Self {
        let action = Vocabulary::Pair.action(hidden);
        Self {
            hidden,
            expanded: !hidden,
            tooltip: action.to_string(),
            text: None,
        }
    }

    /// Presentation of the page-wide button.
    ///
    /// With no custom label the button text follows the state vocabulary.
    pub fn global(hidden: bool, custom_label: Option<&str>) -> Self {
        let action = Vocabulary::Global.action(hidden);
        Self {
            hidden,
            expanded: !hidden,
            tooltip: action.to_string(),
            text: Some(custom_label.unwrap_or(action).to_string()),
        }
    }

    /// `aria-label` for a button whose current text is `visible`.
    ///
    /// Starts with the visible text so spoken and displayed names match, then
    /// names the action. Text set by the presentation wins over `visible`.
    pub fn accessible_name(&self, visible: &str) -> String {
        let visible = self.text.as_deref().unwrap_or(visible).trim();
        if visible.is_empty() || visible == self.tooltip {
            self.tooltip.clone()
        } else {
            format!("{}: {}", visible, self.tooltip)
        }
    }
}

/// Write per-pair presentation for `hidden` onto `button`.
pub fn update_state<P: TogglePlatform>(platform: &P, button: &P::Button, hidden: bool) {
    platform.apply_presentation(button, &ButtonPresentation::pair(hidden));
}

/// Write page-wide presentation for `hidden` onto `button`.
pub fn update_global_state<P: TogglePlatform>(
    platform: &P,
    button: &P::Button,
    hidden: bool,
    custom_label: Option<&str>,
) {
    platform.apply_presentation(button, &ButtonPresentation::global(hidden, custom_label));
}

/// Create a per-pair button already showing `hidden`.
pub fn create<P: TogglePlatform>(
    platform: &P,
    cell: &P::Cell,
    toggle_id: &str,
    label: &str,
    hidden: bool,
) -> Result<P::Button, crate::PlatformError> {
    let label = if label.is_empty() { DEFAULT_LABEL } else { label };
    let button = platform.create_button(cell, toggle_id, label)?;
    update_state(platform, &button, hidden);
    Ok(button)
}

/// Keys that activate a button the same way a click does.
///
/// The controls are not native form elements, so Enter and Space have to be
/// handled explicitly.
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " " | "Spacebar")
}
