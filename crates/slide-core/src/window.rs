//! The host environment a widget runs in.

use std::time::Duration;

use crate::dom::Document;
use crate::timer::{TimerId, Timers};

/// A document together with the event loop's timers.
///
/// Widgets receive a `Window` instead of reaching for globals, so tests and
/// embedders decide which page and which clock they run against.
#[derive(Clone, Debug, Default)]
pub struct Window {
    document: Document,
    timers: Timers,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
        self.timers.set_timeout(delay, callback)
    }

    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.timers.clear_timeout(id)
    }
}
