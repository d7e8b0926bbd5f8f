//! Toggle configuration and its precedence layers.
//!
//! Configuration is resolved lowest to highest:
//! built-in defaults → page markers → options passed at init → cell markers.
//! Every layer except the built-in one is a partial [`ToggleOptions`] overlay.

use serde::Deserialize;

use crate::button::DEFAULT_LABEL;

/// Default storage namespace, the first segment of every key.
pub const DEFAULT_NAMESPACE: &str = "output-toggle";

/// Parse a markup boolean.
///
/// Only the literal strings `"true"` and `"false"` are accepted. Anything else,
/// including `"True"`, `"1"` or an empty attribute, is treated as absent so a
/// typo falls back to the next layer instead of silently reading as `false`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Raw attribute values read off a cell or the page, before parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMarkers {
    pub hidden: Option<String>,
    pub sync: Option<String>,
    pub persist: Option<String>,
    pub global: Option<String>,
    pub label: Option<String>,
    pub global_label: Option<String>,
}

impl AttributeMarkers {
    /// Parse into a partial overlay. Unparseable flags are dropped.
    pub fn to_options(&self) -> ToggleOptions {
        ToggleOptions {
            hidden: self.hidden.as_deref().and_then(parse_flag),
            sync: self.sync.as_deref().and_then(parse_flag),
            persist: self.persist.as_deref().and_then(parse_flag),
            global: self.global.as_deref().and_then(parse_flag),
            label: non_empty(self.label.as_deref()),
            global_label: non_empty(self.global_label.as_deref()),
            namespace: None,
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Partial configuration layer. `None` defers to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToggleOptions {
    pub hidden: Option<bool>,
    pub sync: Option<bool>,
    pub persist: Option<bool>,
    pub global: Option<bool>,
    pub label: Option<String>,
    pub global_label: Option<String>,
    pub namespace: Option<String>,
}

/// Document-level configuration, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleDefaults {
    /// Outputs start hidden.
    pub hidden: bool,
    /// Cells synchronize their outputs.
    pub sync: bool,
    /// State is persisted per page.
    pub persist: bool,
    /// Add the page-wide button.
    pub global: bool,
    /// Button text for per-pair buttons.
    pub label: String,
    /// Button text for the page-wide button. `None` uses the state vocabulary.
    pub global_label: Option<String>,
    /// First segment of every storage key.
    pub namespace: String,
}

impl Default for ToggleDefaults {
    fn default() -> Self {
        Self {
            hidden: false,
            sync: false,
            persist: false,
            global: false,
            label: DEFAULT_LABEL.to_string(),
            global_label: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl ToggleDefaults {
    /// Overlay a partial layer on top of these defaults.
    pub fn merge(mut self, layer: &ToggleOptions) -> Self {
        if let Some(hidden) = layer.hidden {
            self.hidden = hidden;
        }
        if let Some(sync) = layer.sync {
            self.sync = sync;
        }
        if let Some(persist) = layer.persist {
            self.persist = persist;
        }
        if let Some(global) = layer.global {
            self.global = global;
        }
        if let Some(label) = &layer.label {
            self.label = label.clone();
        }
        if let Some(global_label) = &layer.global_label {
            self.global_label = Some(global_label.clone());
        }
        if let Some(namespace) = &layer.namespace {
            self.namespace = namespace.clone();
        }
        self
    }
}

/// Effective configuration for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellConfig {
    pub hidden: bool,
    pub sync: bool,
    pub persist: bool,
    pub label: String,
}

impl CellConfig {
    /// Resolve a cell's markers against the document defaults.
    pub fn resolve(defaults: &ToggleDefaults, markers: &AttributeMarkers) -> Self {
        let layer = markers.to_options();
        Self {
            hidden: layer.hidden.unwrap_or(defaults.hidden),
            sync: layer.sync.unwrap_or(defaults.sync),
            persist: layer.persist.unwrap_or(defaults.persist),
            label: layer.label.unwrap_or_else(|| defaults.label.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_literals_only() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag("True"), None);
        assert_eq!(parse_flag("1"), None);
        assert_eq!(parse_flag(""), None);
        assert_eq!(parse_flag("ture"), None);
    }

    #[test]
    fn test_builtin_defaults() {
        let defaults = ToggleDefaults::default();
        assert!(!defaults.hidden);
        assert!(!defaults.sync);
        assert!(!defaults.persist);
        assert!(!defaults.global);
        assert_eq!(defaults.label, "Output");
        assert_eq!(defaults.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_cell_overrides_document() {
        let defaults = ToggleDefaults {
            hidden: true,
            sync: true,
            ..Default::default()
        };
        let markers = AttributeMarkers {
            hidden: Some("false".into()),
            label: Some("Plot".into()),
            ..Default::default()
        };

        let config = CellConfig::resolve(&defaults, &markers);
        assert!(!config.hidden);
        assert!(config.sync);
        assert!(!config.persist);
        assert_eq!(config.label, "Plot");
    }

    #[test]
    fn test_typo_falls_back_to_document() {
        let defaults = ToggleDefaults {
            hidden: true,
            ..Default::default()
        };
        let markers = AttributeMarkers {
            hidden: Some("flase".into()),
            ..Default::default()
        };

        assert!(CellConfig::resolve(&defaults, &markers).hidden);
    }

    #[test]
    fn test_blank_label_ignored() {
        let markers = AttributeMarkers {
            label: Some("   ".into()),
            ..Default::default()
        };
        let config = CellConfig::resolve(&ToggleDefaults::default(), &markers);
        assert_eq!(config.label, "Output");
    }

    #[test]
    fn test_layers_merge_in_order() {
        let page = AttributeMarkers {
            persist: Some("true".into()),
            global: Some("true".into()),
            global_label: Some("Everything".into()),
            ..Default::default()
        };
        let init = ToggleOptions {
            global: Some(false),
            namespace: Some("docs".into()),
            ..Default::default()
        };

        let defaults = ToggleDefaults::default()
            .merge(&page.to_options())
            .merge(&init);
        assert!(defaults.persist);
        assert!(!defaults.global);
        assert_eq!(defaults.global_label.as_deref(), Some("Everything"));
        assert_eq!(defaults.namespace, "docs");
    }

    #[test]
    fn test_options_from_json() {
        let options: ToggleOptions =
            serde_json::from_str(r#"{"hidden": true, "globalLabel": "All"}"#).unwrap();
        assert_eq!(options.hidden, Some(true));
        assert_eq!(options.global_label.as_deref(), Some("All"));
        assert_eq!(options.sync, None);
    }
}
