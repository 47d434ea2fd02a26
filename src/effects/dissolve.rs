//! Hover "dissolve" on product cards.
//!
//! Hover start marks the card's price label and plays the forward SVG filter
//! animations; hover end plays them in reverse and, once they have finished,
//! removes the marks again. Each card owns one cleanup slot, so a re-hover
//! cancels the pending cleanup instead of racing it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, SvgAnimationElement};

use crate::config::DissolveConfig;
use crate::error::EffectError;
use crate::utils::dom::Listener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationRole {
    Turbulence,
    Displacement,
    Blur,
    Opacity,
}

impl AnimationRole {
    pub const ALL: [AnimationRole; 4] = [
        AnimationRole::Turbulence,
        AnimationRole::Displacement,
        AnimationRole::Blur,
        AnimationRole::Opacity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnimationRole::Turbulence => "turbulence",
            AnimationRole::Displacement => "displacement",
            AnimationRole::Blur => "blur",
            AnimationRole::Opacity => "opacity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTrigger {
    pub role: AnimationRole,
    pub direction: Direction,
    pub card: usize,
}

impl AnimationTrigger {
    /// Id of the `<animate>` element, e.g. `blur-reverse-3`.
    pub fn element_id(&self) -> String {
        format!("{}-{}-{}", self.role.as_str(), self.direction.as_str(), self.card)
    }
}

impl fmt::Display for AnimationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.element_id())
    }
}

/// What the controller does to the page. Every operation tolerates missing elements.
pub trait DissolveSurface {
    fn mark_active(&self, card: usize);
    fn clear_active(&self, card: usize);
    fn begin_animation(&self, trigger: AnimationTrigger);
}

/// One-shot timer host. Dropping the returned handle cancels the task.
pub trait CleanupTimers {
    type Handle: 'static;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;
}

/// One cleanup slot per card, sized when the cards are enumerated.
#[derive(Debug)]
pub struct PendingCleanups<H> {
    slots: Vec<Option<H>>,
}

impl<H> PendingCleanups<H> {
    pub fn new(cards: usize) -> Self {
        Self {
            slots: (0..cards).map(|_| None).collect(),
        }
    }

    /// Drops the pending handle, which cancels its timer. Returns whether one existed.
    pub fn cancel(&mut self, card: usize) -> bool {
        self.take(card).is_some()
    }

    /// Stores `handle`, returning the one it displaced.
    pub fn replace(&mut self, card: usize, handle: H) -> Option<H> {
        if card >= self.slots.len() {
            self.slots.resize_with(card + 1, || None);
        }
        self.slots[card].replace(handle)
    }

    pub fn take(&mut self, card: usize) -> Option<H> {
        self.slots.get_mut(card).and_then(Option::take)
    }

    pub fn is_pending(&self, card: usize) -> bool {
        matches!(self.slots.get(card), Some(Some(_)))
    }

    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

pub struct DissolveController<S, T>
where
    S: DissolveSurface + 'static,
    T: CleanupTimers,
{
    surface: Rc<S>,
    timers: T,
    cleanup_delay_ms: u32,
    pending: Rc<RefCell<PendingCleanups<T::Handle>>>,
}

impl<S, T> DissolveController<S, T>
where
    S: DissolveSurface + 'static,
    T: CleanupTimers,
{
    pub fn new(surface: S, timers: T, cards: usize, cleanup_delay_ms: u32) -> Self {
        Self {
            surface: Rc::new(surface),
            timers,
            cleanup_delay_ms,
            pending: Rc::new(RefCell::new(PendingCleanups::new(cards))),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_cleanup_pending(&self, card: usize) -> bool {
        self.pending.borrow().is_pending(card)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().pending_count()
    }

    pub fn hover_start(&self, card: usize) {
        let cancelled = self.pending.borrow_mut().cancel(card);
        if cancelled {
            log::debug!("Card {} re-hovered, pending cleanup cancelled", card);
        }

        self.surface.mark_active(card);
        self.begin_all(card, Direction::Forward);
    }

    pub fn hover_end(&self, card: usize) {
        self.begin_all(card, Direction::Reverse);

        let surface = Rc::downgrade(&self.surface);
        let pending: Weak<RefCell<PendingCleanups<T::Handle>>> = Rc::downgrade(&self.pending);
        let handle = self.timers.schedule(
            self.cleanup_delay_ms,
            Box::new(move || {
                if let Some(surface) = surface.upgrade() {
                    surface.clear_active(card);
                }
                if let Some(pending) = pending.upgrade() {
                    // Release the borrow before the handle is dropped.
                    let finished = pending.borrow_mut().take(card);
                    drop(finished);
                }
            }),
        );

        let displaced = self.pending.borrow_mut().replace(card, handle);
        if displaced.is_some() {
            log::debug!("Card {} had a stale cleanup timer, replaced", card);
        }
    }

    fn begin_all(&self, card: usize, direction: Direction) {
        for role in AnimationRole::ALL {
            self.surface.begin_animation(AnimationTrigger { role, direction, card });
        }
    }
}

/// `setTimeout`-backed timers; a dropped `Timeout` is cleared.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserTimers;

impl CleanupTimers for BrowserTimers {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, task)
    }
}

/// Price labels and SVG animations of the enumerated cards.
pub struct DomSurface {
    document: Document,
    cards: Vec<Element>,
    label_selector: String,
    active_class: String,
    filter_attribute: String,
}

impl DomSurface {
    fn label(&self, card: usize) -> Option<Element> {
        self.cards
            .get(card)?
            .query_selector(&self.label_selector)
            .ok()
            .flatten()
    }
}

impl DissolveSurface for DomSurface {
    fn mark_active(&self, card: usize) {
        let Some(label) = self.label(card) else {
            return;
        };
        if let Err(e) = label.set_attribute(&self.filter_attribute, &card.to_string()) {
            log::debug!("Failed to set {} on card {}: {:?}", self.filter_attribute, card, e);
        }
        if let Err(e) = label.class_list().add_1(&self.active_class) {
            log::debug!("Failed to add {} on card {}: {:?}", self.active_class, card, e);
        }
    }

    fn clear_active(&self, card: usize) {
        let Some(label) = self.label(card) else {
            return;
        };
        if let Err(e) = label.class_list().remove_1(&self.active_class) {
            log::debug!("Failed to remove {} on card {}: {:?}", self.active_class, card, e);
        }
        if let Err(e) = label.remove_attribute(&self.filter_attribute) {
            log::debug!("Failed to remove {} on card {}: {:?}", self.filter_attribute, card, e);
        }
    }

    fn begin_animation(&self, trigger: AnimationTrigger) {
        let animation = self
            .document
            .get_element_by_id(&trigger.element_id())
            .and_then(|element| element.dyn_into::<SvgAnimationElement>().ok());
        match animation {
            Some(animation) => {
                if let Err(e) = animation.begin_element() {
                    log::debug!("beginElement() failed for {}: {:?}", trigger, e);
                }
            }
            None => log::debug!("No animation element #{}", trigger),
        }
    }
}

/// Owns the per-card listeners and the controller; dropping it cancels pending cleanups.
pub struct DissolveHandle {
    _listeners: Vec<Listener>,
    controller: Rc<DissolveController<DomSurface, BrowserTimers>>,
}

impl DissolveHandle {
    pub fn card_count(&self) -> usize {
        self.controller.surface().cards.len()
    }
}

pub fn install(
    document: &Document,
    config: &DissolveConfig,
) -> Result<Option<DissolveHandle>, EffectError> {
    let nodes = document
        .query_selector_all(&config.card_selector)
        .map_err(|e| EffectError::js("query_selector_all", e))?;

    let cards: Vec<Element> = (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect();
    if cards.is_empty() {
        log::debug!("No {} cards, dissolve effect disabled", config.card_selector);
        return Ok(None);
    }

    let surface = DomSurface {
        document: document.clone(),
        cards: cards.clone(),
        label_selector: config.label_selector.clone(),
        active_class: config.active_class.clone(),
        filter_attribute: config.filter_attribute.clone(),
    };
    let controller = Rc::new(DissolveController::new(
        surface,
        BrowserTimers,
        cards.len(),
        config.cleanup_delay_ms,
    ));

    let mut listeners = Vec::with_capacity(cards.len() * 2);
    for (index, card) in cards.iter().enumerate() {
        let enter = Rc::downgrade(&controller);
        listeners.push(Listener::new(card, "mouseenter", move |_| {
            if let Some(controller) = enter.upgrade() {
                controller.hover_start(index);
            }
        })?);

        let leave = Rc::downgrade(&controller);
        listeners.push(Listener::new(card, "mouseleave", move |_| {
            if let Some(controller) = leave.upgrade() {
                controller.hover_end(index);
            }
        })?);
    }

    Ok(Some(DissolveHandle {
        _listeners: listeners,
        controller,
    }))
}
