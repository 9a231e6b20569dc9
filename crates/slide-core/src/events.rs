//! Event handling infrastructure.
//!
//! This module provides pointer events, the listener registry stored on each
//! node, DOM-style dispatch (capture, target, bubble), and the
//! [`bind_events`]/[`unbind_events`] bridge that registers one handler for
//! several space-separated event names at once.
//!
//! Listener identity is the handler's `Rc` allocation together with the
//! event name and capture flag, exactly like `addEventListener`: removing a
//! listener needs the same [`EventHandler`] clone and an equal capture flag.

use std::cell::Cell;
use std::rc::Rc;

use crate::dom::{Document, NodeId};

/// Callback invoked for a dispatched event.
///
/// Uses `Rc` since the document is single-threaded.
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Options accepted when registering a listener.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Run during the capture phase instead of the bubble phase.
    pub capture: bool,
    /// Remove the listener after its first invocation.
    pub once: bool,
    /// The listener never cancels the event; `prevent_default` is ignored.
    pub passive: bool,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self {
            capture: true,
            ..Self::default()
        }
    }

    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn with_passive(mut self, passive: bool) -> Self {
        self.passive = passive;
        self
    }
}

impl From<bool> for ListenerOptions {
    fn from(capture: bool) -> Self {
        Self {
            capture,
            ..Self::default()
        }
    }
}

/// A single touch point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Touch {
    pub identifier: u32,
    pub client_x: f64,
    pub client_y: f64,
}

impl Touch {
    pub fn new(identifier: u32, client_x: f64, client_y: f64) -> Self {
        Self {
            identifier,
            client_x,
            client_y,
        }
    }
}

/// Pointer payload carried by an event.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PointerData {
    #[default]
    None,
    Mouse { client_x: f64, client_y: f64 },
    Touch { changed_touches: Vec<Touch> },
}

/// A dispatched event.
#[derive(Clone, Debug)]
pub struct Event {
    event_type: String,
    cancelable: bool,
    bubbles: bool,
    pointer: PointerData,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    in_passive_listener: Cell<bool>,
    target: Cell<Option<NodeId>>,
    current_target: Cell<Option<NodeId>>,
}

impl Event {
    /// A plain event that neither bubbles nor can be canceled.
    pub fn new(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            cancelable: false,
            bubbles: false,
            pointer: PointerData::None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
            in_passive_listener: Cell::new(false),
            target: Cell::new(None),
            current_target: Cell::new(None),
        }
    }

    /// A bubbling, cancelable mouse event at the given client coordinates.
    pub fn mouse(event_type: &str, client_x: f64, client_y: f64) -> Self {
        Self {
            cancelable: true,
            bubbles: true,
            pointer: PointerData::Mouse { client_x, client_y },
            ..Self::new(event_type)
        }
    }

    /// A bubbling, cancelable touch event with the given changed touches.
    pub fn touch(event_type: &str, changed_touches: Vec<Touch>) -> Self {
        Self {
            cancelable: true,
            bubbles: true,
            pointer: PointerData::Touch { changed_touches },
            ..Self::new(event_type)
        }
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn pointer(&self) -> &PointerData {
        &self.pointer
    }

    /// Horizontal client coordinate of the mouse, or of the first changed touch.
    pub fn client_x(&self) -> Option<f64> {
        match &self.pointer {
            PointerData::Mouse { client_x, .. } => Some(*client_x),
            PointerData::Touch { changed_touches } => changed_touches.first().map(|t| t.client_x),
            PointerData::None => None,
        }
    }

    /// Vertical client coordinate of the mouse, or of the first changed touch.
    pub fn client_y(&self) -> Option<f64> {
        match &self.pointer {
            PointerData::Mouse { client_y, .. } => Some(*client_y),
            PointerData::Touch { changed_touches } => changed_touches.first().map(|t| t.client_y),
            PointerData::None => None,
        }
    }

    /// Cancel the default action. Ignored for non-cancelable events and
    /// inside passive listeners.
    pub fn prevent_default(&self) {
        if self.cancelable && !self.in_passive_listener.get() {
            self.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// The node the event was dispatched to.
    pub fn target(&self) -> Option<NodeId> {
        self.target.get()
    }

    /// The node whose listener is currently running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }
}

/// Something listeners can be bound to: a selector, a node, or the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Selector(String),
    Node(NodeId),
    Document,
}

impl Target {
    /// Whether this target is a selector string that still needs resolving.
    pub fn is_selector(&self) -> bool {
        matches!(self, Target::Selector(_))
    }

    /// Whether this target is an already-resolved node reference.
    pub fn is_node(&self) -> bool {
        matches!(self, Target::Node(_) | Target::Document)
    }

    /// Whether this target refers directly to a single element node.
    pub fn is_element(&self, doc: &Document) -> bool {
        match self {
            Target::Node(id) => doc.is_element(*id),
            _ => false,
        }
    }

    /// Resolve to a node, looking selectors up in `doc`.
    pub fn resolve(&self, doc: &Document) -> Option<NodeId> {
        match self {
            Target::Selector(selectors) => doc.query_selector(selectors),
            Target::Node(id) => doc.exists(*id).then_some(*id),
            Target::Document => Some(doc.document_node()),
        }
    }
}

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Target::Node(id)
    }
}

impl From<&str> for Target {
    fn from(selectors: &str) -> Self {
        Target::Selector(selectors.to_string())
    }
}

impl From<String> for Target {
    fn from(selectors: String) -> Self {
        Target::Selector(selectors)
    }
}

/// A registered listener.
pub(crate) struct Listener {
    event_type: String,
    handler: EventHandler,
    options: ListenerOptions,
    removed: Rc<Cell<bool>>,
}

impl Listener {
    fn is(&self, event_type: &str, handler: &EventHandler, capture: bool) -> bool {
        self.event_type == event_type
            && same_handler(&self.handler, handler)
            && self.options.capture == capture
    }
}

/// Compare handlers by allocation, ignoring vtable metadata.
fn same_handler(a: &EventHandler, b: &EventHandler) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a) as *const (),
        Rc::as_ptr(b) as *const (),
    )
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Capturing,
    AtTarget,
    Bubbling,
}

impl Document {
    /// Register `handler` for `event_type` on `node`.
    ///
    /// Registering the same handler, event name and capture flag twice has no
    /// effect.
    pub fn add_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        handler: &EventHandler,
        options: impl Into<ListenerOptions>,
    ) {
        let options = options.into();
        let mut inner = self.inner.borrow_mut();
        let Some(node) = inner.node_mut(node) else {
            return;
        };
        if node
            .listeners
            .iter()
            .any(|l| l.is(event_type, handler, options.capture))
        {
            return;
        }
        node.listeners.push(Listener {
            event_type: event_type.to_string(),
            handler: Rc::clone(handler),
            options,
            removed: Rc::new(Cell::new(false)),
        });
    }

    /// Remove the listener registered with the same event name, handler and
    /// capture flag.
    pub fn remove_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        handler: &EventHandler,
        options: impl Into<ListenerOptions>,
    ) {
        let capture = options.into().capture;
        let mut inner = self.inner.borrow_mut();
        let Some(node) = inner.node_mut(node) else {
            return;
        };
        node.listeners.retain(|l| {
            let matched = l.is(event_type, handler, capture);
            if matched {
                l.removed.set(true);
            }
            !matched
        });
    }

    pub fn has_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        handler: &EventHandler,
        capture: bool,
    ) -> bool {
        self.inner
            .borrow()
            .node(node)
            .is_some_and(|n| n.listeners.iter().any(|l| l.is(event_type, handler, capture)))
    }

    /// Number of listeners registered on `node`, for any event.
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.inner
            .borrow()
            .node(node)
            .map_or(0, |n| n.listeners.len())
    }

    /// Dispatch `event` to `target`, running capture, target and bubble
    /// phases along the target's ancestor path.
    ///
    /// Returns `false` if a listener canceled the event.
    pub fn dispatch_event(&self, target: NodeId, event: &Event) -> bool {
        if !self.exists(target) {
            return true;
        }
        event.target.set(Some(target));
        event.propagation_stopped.set(false);

        let mut path = vec![target];
        let mut current = self.parent(target);
        while let Some(node) = current {
            path.push(node);
            current = self.parent(node);
        }

        for node in path.iter().skip(1).rev() {
            self.invoke(*node, event, Phase::Capturing);
            if event.propagation_stopped.get() {
                break;
            }
        }
        if !event.propagation_stopped.get() {
            self.invoke(target, event, Phase::AtTarget);
        }
        if event.bubbles && !event.propagation_stopped.get() {
            for node in path.iter().skip(1) {
                self.invoke(*node, event, Phase::Bubbling);
                if event.propagation_stopped.get() {
                    break;
                }
            }
        }

        event.current_target.set(None);
        !event.default_prevented()
    }

    fn invoke(&self, node: NodeId, event: &Event, phase: Phase) {
        // Snapshot so listeners can add or remove listeners while we run.
        let snapshot: Vec<(EventHandler, ListenerOptions, Rc<Cell<bool>>)> = {
            let inner = self.inner.borrow();
            let Some(data) = inner.node(node) else {
                return;
            };
            data.listeners
                .iter()
                .filter(|l| l.event_type == event.event_type)
                .filter(|l| match phase {
                    Phase::Capturing => l.options.capture,
                    Phase::AtTarget => true,
                    Phase::Bubbling => !l.options.capture,
                })
                .map(|l| (Rc::clone(&l.handler), l.options, Rc::clone(&l.removed)))
                .collect()
        };

        event.current_target.set(Some(node));
        for (handler, options, removed) in snapshot {
            if removed.get() {
                continue;
            }
            if options.once {
                self.remove_event_listener(node, &event.event_type, &handler, options);
            }
            event.in_passive_listener.set(options.passive);
            handler(event);
            event.in_passive_listener.set(false);
        }
    }
}

/// Register `handler` for every space-separated name in `events` on `target`.
///
/// A selector that matches nothing makes this a silent no-op.
pub fn bind_events(
    doc: &Document,
    target: impl Into<Target>,
    events: &str,
    handler: &EventHandler,
    options: impl Into<ListenerOptions>,
) {
    let Some(node) = target.into().resolve(doc) else {
        return;
    };
    let options = options.into();
    for event in events.split_whitespace() {
        doc.add_event_listener(node, event, handler, options);
    }
}

/// Mirror of [`bind_events`]: removes `handler` for every name in `events`.
///
/// `options` must carry the same capture flag the handler was bound with.
pub fn unbind_events(
    doc: &Document,
    target: impl Into<Target>,
    events: &str,
    handler: &EventHandler,
    options: impl Into<ListenerOptions>,
) {
    let Some(node) = target.into().resolve(doc) else {
        return;
    };
    let options = options.into();
    for event in events.split_whitespace() {
        doc.remove_event_listener(node, event, handler, options);
    }
}
