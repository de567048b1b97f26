//! Browser bindings: DOM touch events in, `navigator.vibrate` out.

use crate::surface::{
    SharedEngine, SubscribeOptions, SurfaceBinding, SurfaceListener, SurfaceSubscription,
    TouchSurface,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use touchkit_core::{
    HapticDevice, HapticError, HapticIntensity, TouchInput, TouchPhase, TouchSample,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, HtmlElement, TouchEvent, TouchList};

const TOUCH_EVENTS: [(&str, TouchPhase); 4] = [
    ("touchstart", TouchPhase::Start),
    ("touchmove", TouchPhase::Move),
    ("touchend", TouchPhase::End),
    ("touchcancel", TouchPhase::Cancel),
];

/// Milliseconds from `performance.now()`, or 0 outside a window.
pub fn now_ms() -> u64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0, |p| p.now() as u64)
}

fn samples_from(list: &TouchList, timestamp_ms: u64) -> Vec<TouchSample> {
    let mut samples = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        if let Some(touch) = list.get(i) {
            samples.push(TouchSample::new(
                touch.client_x() as f32,
                touch.client_y() as f32,
                timestamp_ms,
            ));
        }
    }
    samples
}

/// Convert a DOM touch event into an engine frame.
///
/// Start and move frames carry every active touch; end and cancel frames
/// carry the touches that changed. Returns `None` when there is nothing to
/// report.
pub fn touch_event_to_input(
    event: &TouchEvent,
    phase: TouchPhase,
    timestamp_ms: u64,
) -> Option<TouchInput> {
    let active = event.touches();
    let samples = match phase {
        TouchPhase::Start | TouchPhase::Move => samples_from(&active, timestamp_ms),
        TouchPhase::End | TouchPhase::Cancel => {
            samples_from(&event.changed_touches(), timestamp_ms)
        }
    };
    if samples.is_empty() {
        return None;
    }
    Some(TouchInput::new(phase, samples, active.length() as usize))
}

struct Registration {
    callbacks: Vec<(&'static str, Closure<dyn FnMut(TouchEvent)>)>,
}

type DispatchHook = Rc<RefCell<Option<Box<dyn FnMut()>>>>;

/// Touch events of one DOM element.
pub struct BrowserSurface {
    element: HtmlElement,
    next_id: u64,
    registrations: HashMap<SurfaceSubscription, Registration>,
    /// Runs on the main thread after every delivered event.
    after_dispatch: DispatchHook,
}

impl std::fmt::Debug for BrowserSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSurface")
            .field("listeners", &self.registrations.len())
            .finish_non_exhaustive()
    }
}

impl BrowserSurface {
    /// Wrap `element`. No listeners are installed until a subscription.
    pub fn new(element: HtmlElement) -> Self {
        Self {
            element,
            next_id: 0,
            registrations: HashMap::new(),
            after_dispatch: Rc::new(RefCell::new(None)),
        }
    }

    /// Look up an element by id.
    pub fn by_id(id: &str) -> Result<Self, JsValue> {
        let element = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .ok_or_else(|| JsValue::from_str(&format!("element '{id}' not found")))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| JsValue::from_str(&format!("element '{id}' is not an HtmlElement")))?;
        Ok(Self::new(element))
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.registrations.len()
    }

    pub(crate) fn set_after_dispatch(&mut self, hook: Option<Box<dyn FnMut()>>) {
        *self.after_dispatch.borrow_mut() = hook;
    }
}

impl TouchSurface for BrowserSurface {
    fn subscribe(
        &mut self,
        options: SubscribeOptions,
        listener: SurfaceListener,
    ) -> SurfaceSubscription {
        let id = SurfaceSubscription(self.next_id);
        self.next_id += 1;

        let listener = Rc::new(RefCell::new(listener));
        let dom_options = AddEventListenerOptions::new();
        dom_options.set_passive(options.passive);

        let mut callbacks = Vec::with_capacity(TOUCH_EVENTS.len());
        for (name, phase) in TOUCH_EVENTS {
            let listener = Rc::clone(&listener);
            let after_dispatch = Rc::clone(&self.after_dispatch);
            let passive = options.passive;
            let cb = Closure::<dyn FnMut(TouchEvent)>::new(move |event: TouchEvent| {
                let Some(input) = touch_event_to_input(&event, phase, now_ms()) else {
                    return;
                };
                let prevent = {
                    let mut listener = listener.borrow_mut();
                    (*listener)(&input)
                };
                if prevent && !passive {
                    event.prevent_default();
                }
                if let Some(hook) = after_dispatch.borrow_mut().as_mut() {
                    hook();
                }
            });
            if let Err(err) = self
                .element
                .add_event_listener_with_callback_and_add_event_listener_options(
                    name,
                    cb.as_ref().unchecked_ref(),
                    &dom_options,
                )
            {
                tracing::warn!(event = name, error = ?err, "failed to add touch listener");
            }
            callbacks.push((name, cb));
        }

        self.registrations.insert(id, Registration { callbacks });
        id
    }

    fn unsubscribe(&mut self, subscription: SurfaceSubscription) -> bool {
        let Some(registration) = self.registrations.remove(&subscription) else {
            return false;
        };
        for (name, cb) in &registration.callbacks {
            let _ = self
                .element
                .remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
        }
        true
    }
}

/// One `setTimeout` callback, reused for every engine deadline.
struct TimerPump {
    engine: SharedEngine,
    /// Browser timeout handle and the deadline it was armed for.
    armed: Cell<Option<(i32, u64)>>,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl std::fmt::Debug for TimerPump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerPump")
            .field("armed", &self.armed.get())
            .finish_non_exhaustive()
    }
}

impl TimerPump {
    fn new(engine: SharedEngine) -> Rc<Self> {
        Rc::new_cyclic(|pump: &Weak<Self>| {
            let pump = pump.clone();
            let callback = Closure::<dyn FnMut()>::new(move || {
                if let Some(pump) = pump.upgrade() {
                    pump.fire();
                }
            });
            Self {
                engine,
                armed: Cell::new(None),
                callback: RefCell::new(Some(callback)),
            }
        })
    }

    fn fire(&self) {
        self.armed.set(None);
        let next = {
            let mut engine = self.engine.lock().expect("engine mutex not poisoned");
            engine.advance_to(now_ms());
            engine.next_deadline()
        };
        self.reschedule(next);
    }

    /// Arm the timeout for the engine's next deadline.
    fn sync(&self) {
        let next = self
            .engine
            .lock()
            .expect("engine mutex not poisoned")
            .next_deadline();
        self.reschedule(next);
    }

    fn reschedule(&self, next: Option<u64>) {
        if next.is_some() && self.armed.get().map(|(_, deadline)| deadline) == next {
            return;
        }
        self.clear();
        let (Some(deadline), Some(window)) = (next, web_sys::window()) else {
            return;
        };
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        let delay = deadline.saturating_sub(now_ms()).min(i32::MAX as u64) as i32;
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(handle) => self.armed.set(Some((handle, deadline))),
            Err(err) => tracing::warn!(error = ?err, "failed to schedule gesture timer"),
        }
    }

    fn clear(&self) {
        if let (Some((handle, _)), Some(window)) = (self.armed.take(), web_sys::window()) {
            window.clear_timeout_with_handle(handle);
        }
    }

    /// Clear the timeout and release the callback.
    fn cancel(&self) {
        self.clear();
        self.callback.borrow_mut().take();
    }
}

/// An engine attached to a DOM element, with timers pumped by `setTimeout`.
#[derive(Debug)]
pub struct BrowserBinding {
    surface: BrowserSurface,
    binding: SurfaceBinding,
    pump: Rc<TimerPump>,
}

impl BrowserBinding {
    /// Route touch events of `element` into `engine`.
    pub fn attach_element(element: HtmlElement, engine: SharedEngine) -> Self {
        console_error_panic_hook::set_once();

        let mut surface = BrowserSurface::new(element);
        let pump = TimerPump::new(Arc::clone(&engine));
        let binding = SurfaceBinding::attach(&mut surface, engine);
        let hook_pump = Rc::clone(&pump);
        surface.set_after_dispatch(Some(Box::new(move || hook_pump.sync())));

        Self {
            surface,
            binding,
            pump,
        }
    }

    /// The engine events are fed into.
    pub const fn engine(&self) -> &SharedEngine {
        self.binding.engine()
    }

    /// Remove the DOM listeners and the pending timer.
    pub fn detach(&mut self) -> bool {
        self.surface.set_after_dispatch(None);
        self.pump.cancel();
        self.binding.detach(&mut self.surface)
    }
}

impl Drop for BrowserBinding {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Haptic device backed by `navigator.vibrate`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigatorVibrator;

impl HapticDevice for NavigatorVibrator {
    fn emit(&mut self, intensity: HapticIntensity) -> Result<(), HapticError> {
        let window = web_sys::window().ok_or(HapticError::Unsupported)?;
        let pattern: js_sys::Array = intensity
            .pattern()
            .iter()
            .map(|ms| JsValue::from(*ms))
            .collect();
        if window.navigator().vibrate_with_pattern(&pattern) {
            Ok(())
        } else {
            Err(HapticError::Device("vibration rejected".to_string()))
        }
    }
}
