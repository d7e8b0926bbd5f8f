//! Activation listeners.
//!
//! Each listener owns a clone of the button's `ToggleBinding`, captured when
//! the button was bound, plus the page-wide binding whose presentation has to
//! follow per-pair actions.

use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use toggle_core::{KeyValueStore, ToggleBinding, ToggleContext, is_activation_key};
use wasm_bindgen::JsCast;

use crate::page::BrowserPage;

/// Attach click and keyboard activation to a bound button.
///
/// Dropping the returned listeners detaches them.
pub fn bind<S>(
    ctx: &Rc<ToggleContext<BrowserPage, S>>,
    binding: &ToggleBinding<BrowserPage>,
    global: Option<&ToggleBinding<BrowserPage>>,
) -> [EventListener; 2]
where
    S: KeyValueStore + 'static,
{
    let click = {
        let ctx = Rc::clone(ctx);
        let binding = binding.clone();
        let global = global.cloned();
        let target = binding.button.clone();
        EventListener::new(&target, "click", move |_event| {
            ctx.activate(&binding, global.as_ref());
        })
    };

    let keydown = {
        let ctx = Rc::clone(ctx);
        let binding = binding.clone();
        let global = global.cloned();
        let target = binding.button.clone();
        EventListener::new_with_options(
            &target,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                    return;
                };
                if event.repeat() || !is_activation_key(&event.key()) {
                    return;
                }
                // Space would otherwise scroll the page.
                event.prevent_default();
                ctx.activate(&binding, global.as_ref());
            },
        )
    };

    [click, keydown]
}
