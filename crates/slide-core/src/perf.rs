//! Debounced handlers for hot event paths.
//!
//! A [`Debounce`] wraps a method together with a value captured when the
//! wrapper is built (the "outer" argument). Every call cancels the pending
//! invocation and schedules a new one after the delay, so a burst of events
//! collapses into one trailing call that sees the latest event.

use std::cell::{Cell, OnceCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::events::{Event, EventHandler};
use crate::timer::{TimerId, Timers};

struct DebounceInner<O, E> {
    timers: Timers,
    delay: Duration,
    outer: O,
    method: Box<dyn Fn(O, E)>,
    pending: Cell<Option<TimerId>>,
    listener: OnceCell<EventHandler>,
}

impl<O, E> Drop for DebounceInner<O, E> {
    fn drop(&mut self) {
        if let Some(id) = self.pending.take() {
            self.timers.clear_timeout(id);
        }
    }
}

/// A trailing-edge debounced method.
///
/// Dropping the last handle cancels any pending call.
pub struct Debounce<O, E> {
    inner: Rc<DebounceInner<O, E>>,
}

impl<O, E> Clone for Debounce<O, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<O, E> std::fmt::Debug for Debounce<O, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounce")
            .field("delay", &self.inner.delay)
            .field("pending", &self.inner.pending.get())
            .finish()
    }
}

impl<O: Clone + 'static, E: 'static> Debounce<O, E> {
    /// Wrap `method`, which will receive `outer` followed by the latest event.
    pub fn new(
        timers: &Timers,
        delay: Duration,
        outer: O,
        method: impl Fn(O, E) + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(DebounceInner {
                timers: timers.clone(),
                delay,
                outer,
                method: Box::new(method),
                pending: Cell::new(None),
                listener: OnceCell::new(),
            }),
        }
    }

    /// Cancel the pending call, if any, and schedule a new one with `event`.
    pub fn call(&self, event: E) {
        schedule(&self.inner, event);
    }

    /// Cancel the pending call. Returns `false` if nothing was pending.
    pub fn cancel(&self) -> bool {
        match self.inner.pending.take() {
            Some(id) => self.inner.timers.clear_timeout(id),
            None => false,
        }
    }

    /// The timer of the pending call.
    pub fn pending(&self) -> Option<TimerId> {
        self.inner.pending.get()
    }
}

impl<O: Clone + 'static> Debounce<O, Event> {
    /// An event handler that feeds events into this wrapper.
    ///
    /// Always returns the same handler, so it can be bound and later unbound.
    /// The handler does not keep the wrapper alive.
    pub fn listener(&self) -> EventHandler {
        Rc::clone(self.inner.listener.get_or_init(|| {
            let weak: Weak<DebounceInner<O, Event>> = Rc::downgrade(&self.inner);
            let handler: EventHandler = Rc::new(move |event: &Event| {
                if let Some(inner) = weak.upgrade() {
                    schedule(&inner, event.clone());
                }
            });
            handler
        }))
    }
}

fn schedule<O: Clone + 'static, E: 'static>(inner: &Rc<DebounceInner<O, E>>, event: E) {
    if let Some(id) = inner.pending.take() {
        inner.timers.clear_timeout(id);
    }
    let weak = Rc::downgrade(inner);
    let id = inner.timers.set_timeout(inner.delay, move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.pending.set(None);
        (inner.method)(inner.outer.clone(), event);
    });
    inner.pending.set(Some(id));
}
