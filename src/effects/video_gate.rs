//! Plays the page video only while it is (nearly) on screen.

use std::cell::Cell;

use js_sys::Array;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, HtmlMediaElement, HtmlVideoElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use crate::config::VideoConfig;
use crate::error::EffectError;
use crate::utils::dom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    PausedAtStart,
}

/// Playback controls the gate needs from a media element.
pub trait VideoSink {
    fn start_playback(&self);
    fn halt_playback(&self);
    fn seek_to_start(&self);
}

#[derive(Debug)]
pub struct VisibilityGate {
    state: Cell<PlaybackState>,
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self {
            state: Cell::new(PlaybackState::PausedAtStart),
        }
    }
}

impl VisibilityGate {
    pub fn state(&self) -> PlaybackState {
        self.state.get()
    }

    /// Entering the observed region plays without seeking. Leaving pauses and rewinds.
    pub fn on_visibility<S: VideoSink + ?Sized>(&self, intersecting: bool, sink: &S) {
        if intersecting {
            sink.start_playback();
            self.state.set(PlaybackState::Playing);
        } else {
            sink.halt_playback();
            sink.seek_to_start();
            self.state.set(PlaybackState::PausedAtStart);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObserverSettings {
    pub threshold: f64,
    pub root_margin_px: f64,
}

impl ObserverSettings {
    pub fn from_config(config: &VideoConfig) -> Self {
        Self {
            threshold: config.threshold,
            root_margin_px: config.root_margin_px,
        }
    }

    /// CSS margin shorthand applied to all four sides.
    pub fn root_margin(&self) -> String {
        dom::px(self.root_margin_px)
    }
}

impl VideoSink for HtmlVideoElement {
    fn start_playback(&self) {
        match HtmlMediaElement::play(self) {
            Ok(promise) => spawn_local(async move {
                // Autoplay policies reject the promise; the next intersection retries.
                if let Err(e) = JsFuture::from(promise).await {
                    log::debug!("Video play() rejected: {:?}", e);
                }
            }),
            Err(e) => log::debug!("Video play() failed: {:?}", e),
        }
    }

    fn halt_playback(&self) {
        if let Err(e) = HtmlMediaElement::pause(self) {
            log::debug!("Video pause() failed: {:?}", e);
        }
    }

    fn seek_to_start(&self) {
        self.set_current_time(0.0);
    }
}

/// Disconnects the observer when dropped.
pub struct VideoGateHandle {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl Drop for VideoGateHandle {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

pub fn install(
    document: &Document,
    config: &VideoConfig,
) -> Result<Option<VideoGateHandle>, EffectError> {
    let Some(target) = document.get_element_by_id(&config.element_id) else {
        log::debug!("No #{} element, video gate disabled", config.element_id);
        return Ok(None);
    };

    let gate = VisibilityGate::default();
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let Ok(video) = entry.target().dyn_into::<HtmlVideoElement>() else {
                    continue;
                };
                gate.on_visibility(entry.is_intersecting(), &video);
            }
        },
    );

    let settings = ObserverSettings::from_config(config);
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(settings.threshold));
    init.set_root_margin(&settings.root_margin());

    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
        .map_err(|e| EffectError::js("IntersectionObserver", e))?;
    observer.observe(&target);

    Ok(Some(VideoGateHandle {
        observer,
        _callback: callback,
    }))
}
