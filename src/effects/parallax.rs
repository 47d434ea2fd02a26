//! Inverse parallax: publishes the scroll position, scaled, as a CSS variable
//! on the root element. Scroll bursts are coalesced to one write per frame.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Window};

use crate::config::ParallaxConfig;
use crate::error::EffectError;
use crate::utils::dom::{self, Listener};

/// Allows at most one pending animation-frame callback.
#[derive(Debug, Default)]
pub struct FrameGate {
    ticking: Cell<bool>,
}

impl FrameGate {
    /// Returns `true` when the caller should request a frame.
    pub fn try_schedule(&self) -> bool {
        !self.ticking.replace(true)
    }

    pub fn finish(&self) {
        self.ticking.set(false);
    }

    pub fn is_pending(&self) -> bool {
        self.ticking.get()
    }
}

pub fn scroll_offset(scroll_y: f64, factor: f64) -> f64 {
    scroll_y * factor
}

pub fn offset_css_value(scroll_y: f64, factor: f64) -> String {
    dom::px(scroll_offset(scroll_y, factor))
}

#[derive(Debug)]
pub struct ScrollParallax {
    gate: FrameGate,
    factor: f64,
}

impl ScrollParallax {
    pub fn new(factor: f64) -> Self {
        Self {
            gate: FrameGate::default(),
            factor,
        }
    }

    /// Scroll event. `true` means a frame must be requested.
    pub fn on_scroll(&self) -> bool {
        self.gate.try_schedule()
    }

    /// Frame callback; `scroll_y` is read at frame time. Returns the CSS value to publish.
    pub fn on_frame(&self, scroll_y: f64) -> String {
        self.gate.finish();
        offset_css_value(scroll_y, self.factor)
    }

    pub fn frame_pending(&self) -> bool {
        self.gate.is_pending()
    }
}

/// Keeps the scroll listener and the shared frame callback alive.
pub struct ParallaxHandle {
    window: Window,
    frame_id: Rc<Cell<Option<i32>>>,
    _listener: Listener,
    _frame: Rc<Closure<dyn FnMut()>>,
}

impl Drop for ParallaxHandle {
    fn drop(&mut self) {
        if let Some(id) = self.frame_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
    }
}

fn publish(document: &Document, variable: &str, value: &str) {
    let Some(root) = dom::root_element(document) else {
        return;
    };
    if let Err(e) = root.style().set_property(variable, value) {
        log::debug!("Failed to set {}: {:?}", variable, e);
    }
}

pub fn install(
    window: &Window,
    document: &Document,
    config: &ParallaxConfig,
) -> Result<ParallaxHandle, EffectError> {
    let parallax = Rc::new(ScrollParallax::new(config.factor));
    let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

    let frame = Rc::new(Closure::<dyn FnMut()>::new({
        let parallax = parallax.clone();
        let frame_id = frame_id.clone();
        let document = document.clone();
        let variable = config.variable.clone();
        move || {
            frame_id.set(None);
            let scroll_y = web_sys::window()
                .and_then(|win| win.scroll_y().ok())
                .unwrap_or(0.0);
            let value = parallax.on_frame(scroll_y);
            publish(&document, &variable, &value);
        }
    }));

    let listener = Listener::new(window, "scroll", {
        let parallax = parallax.clone();
        let frame_id = frame_id.clone();
        let frame = Rc::downgrade(&frame);
        move |_| {
            if !parallax.on_scroll() {
                return;
            }
            let requested = match (web_sys::window(), frame.upgrade()) {
                (Some(win), Some(frame)) => {
                    let frame: &Closure<dyn FnMut()> = &frame;
                    win.request_animation_frame(frame.as_ref().unchecked_ref()).ok()
                }
                _ => None,
            };
            match requested {
                Some(id) => frame_id.set(Some(id)),
                // No frame is coming, so release the gate for the next scroll.
                None => parallax.gate.finish(),
            }
        }
    })?;

    // Initial publish for pages restored mid-scroll.
    if let Ok(scroll_y) = window.scroll_y() {
        publish(
            document,
            &config.variable,
            &offset_css_value(scroll_y, config.factor),
        );
    }

    Ok(ParallaxHandle {
        window: window.clone(),
        frame_id,
        _listener: listener,
        _frame: frame,
    })
}
