//! Timer queue: the event loop's `setTimeout` / `clearTimeout`.
//!
//! Time is virtual. The host advances it, either from a real clock (see the
//! demo) or step by step in tests, and due callbacks run in order of due
//! time, then scheduling order.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Identifier of a scheduled timer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type TimerCallback = Box<dyn FnOnce()>;

#[derive(Default)]
struct TimerQueue {
    now: Duration,
    next_id: u64,
    entries: BTreeMap<(Duration, TimerId), TimerCallback>,
    due: HashMap<TimerId, Duration>,
}

impl TimerQueue {
    fn pop_due(&mut self, limit: Option<Duration>) -> Option<TimerCallback> {
        let (&(due, id), _) = self.entries.first_key_value()?;
        if limit.is_some_and(|limit| due > limit) {
            return None;
        }
        let callback = self.entries.remove(&(due, id))?;
        self.due.remove(&id);
        self.now = self.now.max(due);
        Some(callback)
    }
}

/// Shared handle to a timer queue.
#[derive(Clone, Default)]
pub struct Timers {
    inner: Rc<RefCell<TimerQueue>>,
}

impl fmt::Debug for Timers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Timers")
            .field("now", &inner.now)
            .field("pending", &inner.entries.len())
            .finish()
    }
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Schedule `callback` to run once `delay` has elapsed.
    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId(inner.next_id);
        inner.next_id += 1;
        let due = inner.now + delay;
        inner.entries.insert((due, id), Box::new(callback));
        inner.due.insert(id, due);
        id
    }

    /// Cancel a pending timer. Returns `false` if it already ran or was canceled.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.due.remove(&id) {
            Some(due) => inner.entries.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.inner.borrow().due.contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Time until the next timer is due, if any.
    pub fn next_due_in(&self) -> Option<Duration> {
        let inner = self.inner.borrow();
        inner
            .entries
            .first_key_value()
            .map(|(&(due, _), _)| due.saturating_sub(inner.now))
    }

    /// Move time forward by `elapsed`, running every timer that falls due.
    ///
    /// Timers scheduled by callbacks run too if they fall due within the
    /// window. Returns the number of callbacks run.
    pub fn advance(&self, elapsed: Duration) -> usize {
        let limit = self.now() + elapsed;
        let mut ran = 0;
        loop {
            let next = self.inner.borrow_mut().pop_due(Some(limit));
            let Some(callback) = next else {
                break;
            };
            callback();
            ran += 1;
        }
        self.inner.borrow_mut().now = limit;
        ran
    }

    /// Run timers until the queue is empty, jumping time forward as needed.
    ///
    /// A callback that keeps rescheduling itself will keep this looping.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.inner.borrow_mut().pop_due(None);
            let Some(callback) = next else {
                break;
            };
            callback();
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn log_timer(
        timers: &Timers,
        log: &Rc<RefCell<Vec<&'static str>>>,
        ms: u64,
        label: &'static str,
    ) -> TimerId {
        let log = Rc::clone(log);
        timers.set_timeout(Duration::from_millis(ms), move || log.borrow_mut().push(label))
    }

    #[test]
    fn test_fires_in_due_order() {
        let timers = Timers::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        log_timer(&timers, &log, 10, "b");
        log_timer(&timers, &log, 5, "a");
        log_timer(&timers, &log, 10, "c");

        assert_eq!(timers.advance(Duration::from_millis(9)), 1);
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(timers.advance(Duration::from_millis(1)), 2);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(timers.now(), Duration::from_millis(10));
    }

    #[test]
    fn test_clear_timeout() {
        let timers = Timers::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = log_timer(&timers, &log, 4, "x");

        assert!(timers.is_pending(id));
        assert!(timers.clear_timeout(id));
        assert!(!timers.clear_timeout(id));
        timers.advance(Duration::from_millis(10));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_callbacks_can_schedule() {
        let timers = Timers::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let timers_clone = timers.clone();
        let log_clone = Rc::clone(&log);
        timers.set_timeout(Duration::from_millis(2), move || {
            log_clone.borrow_mut().push("outer");
            let log = Rc::clone(&log_clone);
            timers_clone.set_timeout(Duration::from_millis(2), move || {
                log.borrow_mut().push("inner")
            });
        });

        assert_eq!(timers.advance(Duration::from_millis(4)), 2);
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_run_until_idle() {
        let timers = Timers::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        log_timer(&timers, &log, 500, "late");
        assert_eq!(timers.next_due_in(), Some(Duration::from_millis(500)));

        assert_eq!(timers.run_until_idle(), 1);
        assert_eq!(timers.now(), Duration::from_millis(500));
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(timers.next_due_in(), None);
    }
}
