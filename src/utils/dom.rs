use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, EventTarget, HtmlElement};

use crate::error::EffectError;

/// Event listener that stays attached until dropped.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Self, EffectError>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|e| EffectError::js("add_event_listener", e))?;

        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

pub fn window() -> Result<web_sys::Window, EffectError> {
    web_sys::window().ok_or(EffectError::NoWindow)
}

/// `<html>` as an `HtmlElement`, the target for page-wide CSS variables.
pub fn root_element(document: &Document) -> Option<HtmlElement> {
    document
        .document_element()
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

/// Format a pixel length the way JS template literals print numbers, so `-0` becomes `0px`.
pub fn px(value: f64) -> String {
    if value == 0.0 {
        "0px".to_string()
    } else {
        format!("{}px", value)
    }
}
