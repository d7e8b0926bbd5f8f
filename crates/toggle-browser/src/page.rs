//! `TogglePlatform` over the live DOM.
//!
//! # CSS Integration
//!
//! Styling is left to the document. At minimum the hidden marker has to hide
//! the region:
//! ```css
//! [data-toggle-output].output-hidden {
//!     display: none;
//! }
//! ```

use smol_str::SmolStr;
use toggle_core::markers::{
    BUTTON_CLASS, BUTTON_HIDDEN_CLASS, BUTTON_TARGET_ATTR, CELL_ATTR, GLOBAL_ATTR,
    GLOBAL_BUTTON_CLASS, GLOBAL_LABEL_ATTR, HIDDEN_ATTR, HIDDEN_CLASS, LABEL_ATTR,
    LIVE_REGION_CLASS, OUTPUT_ATTR, PERSIST_ATTR, SYNC_ATTR, TOGGLE_ID_ATTR,
};
use toggle_core::{AttributeMarkers, ButtonPresentation, PlatformError, TogglePlatform};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Window};

use crate::js_message;

/// Keeps the live region out of the layout while leaving it in the
/// accessibility tree.
const VISUALLY_HIDDEN: &str = "position:absolute;width:1px;height:1px;padding:0;margin:-1px;\
overflow:hidden;clip:rect(0,0,0,0);white-space:nowrap;border:0";

/// The current document, seen through the toggle markup contract.
#[derive(Clone)]
pub struct BrowserPage {
    window: Window,
    document: Document,
}

impl BrowserPage {
    /// The page this script runs in.
    pub fn current() -> Result<Self, PlatformError> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        Ok(Self { window, document })
    }

    fn query_all(&self, root: &Element, selector: &str) -> Vec<Element> {
        let Ok(node_list) = root.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..node_list.length())
            .filter_map(|i| node_list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn create_control(&self, class: &str, target: &str, label: &str) -> Result<Element, PlatformError> {
        let button = self
            .document
            .create_element("div")
            .map_err(|e| PlatformError(js_message(&e)))?;
        button.set_class_name(class);
        set_attr(&button, "role", "button");
        set_attr(&button, "tabindex", "0");
        set_attr(&button, BUTTON_TARGET_ATTR, target);
        button.set_text_content(Some(label));
        Ok(button)
    }
}

fn set_attr(element: &Element, name: &str, value: &str) {
    if let Err(e) = element.set_attribute(name, value) {
        tracing::debug!(name, error = %js_message(&e), "set_attribute failed");
    }
}

fn read_markers(element: &Element) -> AttributeMarkers {
    AttributeMarkers {
        hidden: element.get_attribute(HIDDEN_ATTR),
        sync: element.get_attribute(SYNC_ATTR),
        persist: element.get_attribute(PERSIST_ATTR),
        global: element.get_attribute(GLOBAL_ATTR),
        label: element.get_attribute(LABEL_ATTR),
        global_label: element.get_attribute(GLOBAL_LABEL_ATTR),
    }
}

impl TogglePlatform for BrowserPage {
    type Cell = Element;
    type Region = Element;
    type Button = Element;
    type LiveRegion = Element;

    fn page_path(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn page_markers(&self) -> AttributeMarkers {
        self.document
            .body()
            .map(|body| read_markers(&body))
            .unwrap_or_default()
    }

    fn toggle_cells(&self) -> Vec<Element> {
        let Some(root) = self.document.document_element() else {
            return Vec::new();
        };
        self.query_all(&root, &format!("[{}]", CELL_ATTR))
    }

    fn cell_markers(&self, cell: &Element) -> AttributeMarkers {
        read_markers(cell)
    }

    fn toggle_ids(&self, cell: &Element) -> Vec<SmolStr> {
        let mut ids: Vec<SmolStr> = Vec::new();
        for block in self.query_all(cell, &format!("[{}]", TOGGLE_ID_ATTR)) {
            let Some(id) = block.get_attribute(TOGGLE_ID_ATTR) else {
                continue;
            };
            if !id.is_empty() && !ids.iter().any(|seen| seen == &id) {
                ids.push(SmolStr::new(id));
            }
        }
        ids
    }

    fn output_regions(&self, cell: &Element, toggle_id: &str) -> Vec<Element> {
        // Compare attribute values rather than building a selector, so ids
        // never need CSS escaping.
        self.query_all(cell, &format!("[{}]", OUTPUT_ATTR))
            .into_iter()
            .filter(|region| region.get_attribute(OUTPUT_ATTR).as_deref() == Some(toggle_id))
            .collect()
    }

    fn is_hidden(&self, region: &Element) -> bool {
        region.class_list().contains(HIDDEN_CLASS)
    }

    fn set_hidden(&self, region: &Element, hidden: bool) {
        let _ = region.class_list().toggle_with_force(HIDDEN_CLASS, hidden);
    }

    fn create_button(
        &self,
        cell: &Element,
        toggle_id: &str,
        label: &str,
    ) -> Result<Element, PlatformError> {
        let button = self.create_control(BUTTON_CLASS, toggle_id, label)?;
        let block = self
            .query_all(cell, &format!("[{}]", TOGGLE_ID_ATTR))
            .into_iter()
            .find(|block| block.get_attribute(TOGGLE_ID_ATTR).as_deref() == Some(toggle_id));
        let placed = match block {
            Some(block) => block.before_with_node_1(&button),
            None => cell.prepend_with_node_1(&button),
        };
        placed.map_err(|e| PlatformError(js_message(&e)))?;
        Ok(button)
    }

    fn create_global_button(&self, label: &str) -> Result<Element, PlatformError> {
        let button = self.create_control(GLOBAL_BUTTON_CLASS, "global", label)?;
        let container = match self.document.query_selector("main") {
            Ok(Some(main)) => main,
            _ => self
                .document
                .body()
                .map(Element::from)
                .ok_or("no body")?,
        };
        container
            .prepend_with_node_1(&button)
            .map_err(|e| PlatformError(js_message(&e)))?;
        Ok(button)
    }

    fn apply_presentation(&self, button: &Element, presentation: &ButtonPresentation) {
        let _ = button
            .class_list()
            .toggle_with_force(BUTTON_HIDDEN_CLASS, presentation.hidden);
        set_attr(
            button,
            "aria-expanded",
            if presentation.expanded { "true" } else { "false" },
        );
        set_attr(button, "title", &presentation.tooltip);
        if let Some(text) = &presentation.text {
            if button.text_content().as_deref() != Some(text.as_str()) {
                button.set_text_content(Some(text));
            }
        }
        let visible = button.text_content().unwrap_or_default();
        set_attr(button, "aria-label", &presentation.accessible_name(&visible));
    }

    fn remove_button(&self, button: &Element) {
        button.remove();
    }

    fn create_live_region(&self) -> Result<Element, PlatformError> {
        // A region left behind by an earlier session is reused so the page
        // never carries two.
        if let Ok(Some(existing)) = self
            .document
            .query_selector(&format!(".{}", LIVE_REGION_CLASS))
        {
            return Ok(existing);
        }

        let region = self
            .document
            .create_element("div")
            .map_err(|e| PlatformError(js_message(&e)))?;
        region.set_class_name(LIVE_REGION_CLASS);
        set_attr(&region, "role", "status");
        set_attr(&region, "aria-live", "polite");
        set_attr(&region, "aria-atomic", "true");
        set_attr(&region, "style", VISUALLY_HIDDEN);

        let body = self.document.body().ok_or("no body")?;
        body.append_with_node_1(&region)
            .map_err(|e| PlatformError(js_message(&e)))?;
        Ok(region)
    }

    fn clear_live_region(&self, region: &Element) {
        region.set_text_content(Some(""));
    }

    fn announce_next_frame(&self, region: &Element, message: &str) {
        let target = region.clone();
        let message = message.to_string();
        let callback = Closure::once_into_js(move || {
            target.set_text_content(Some(&message));
        });
        if let Err(e) = self
            .window
            .request_animation_frame(callback.unchecked_ref())
        {
            tracing::debug!(error = %js_message(&e), "requestAnimationFrame failed");
        }
    }

    fn remove_live_region(&self, region: &Element) {
        region.remove();
    }
}
