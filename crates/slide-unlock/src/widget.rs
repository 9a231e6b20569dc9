//! The slide-to-unlock widget controller.
//!
//! # Lifecycle
//!
//! ```text
//!            press                 move past threshold
//!   Idle ─────────────▶ Dragging ─────────────────────▶ Succeeded
//!    ▲                     │ release                        │ reset()
//!    │  rewind finished    ▼                                │
//!    └─────────────── Resetting ◀───────────────────────────┘
//! ```
//!
//! The press listener lives on the block and the release listener on the
//! document, so a drag that ends outside the block still resolves. Moves are
//! tracked by a debounced listener bound on press and unbound on release.
//! Once the widget succeeds, release tears down the press and release
//! listeners as well; `reset()` arms them again.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slide_core::{
    bind_events, unbind_events, Debounce, Document, Event, EventHandler, NodeId, Target, TimerId,
    Window,
};
use tracing::{debug, trace, warn};

use crate::options::SlideOptions;
use crate::visual::{Visual, VisualSnapshot};

const PRESS_EVENTS: &str = "mousedown touchstart";
const MOVE_EVENTS: &str = "mousemove touchmove";
const RELEASE_EVENTS: &str = "mouseup touchend";

/// Interaction state of the widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlideState {
    /// Waiting for a press.
    Idle,
    /// A press is active and moves are being tracked.
    Dragging,
    /// The block reached the end. Stays here until `reset()`.
    Succeeded,
    /// Block and fill are animating back to the start.
    Resetting,
}

/// The four nodes the widget builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlideNodes {
    /// The track, which is also the widget's root.
    pub root: NodeId,
    pub bg: NodeId,
    pub block: NodeId,
    pub text: NodeId,
}

struct DragSession {
    down_x: f64,
    mover: Debounce<f64, Event>,
}

#[derive(Default)]
struct SlideData {
    succeeded: bool,
    nodes: Option<SlideNodes>,
    mount: Option<NodeId>,
    session: Option<DragSession>,
    rewind: Option<TimerId>,
}

struct SlideInner {
    window: Window,
    options: SlideOptions,
    data: RefCell<SlideData>,
    on_press: EventHandler,
    on_release: EventHandler,
}

/// A slide-to-unlock verification widget.
///
/// Cloning the handle shares the widget.
///
/// # Example
///
/// ```ignore
/// let window = Window::new();
/// let widget = SlideUnlock::new(&window, SlideOptions::new().on_success(|w| {
///     println!("verified: {}", w.is_succeeded());
/// }));
/// widget.init();
/// widget.mount("#app");
/// ```
#[derive(Clone)]
pub struct SlideUnlock {
    inner: Rc<SlideInner>,
}

impl std::fmt::Debug for SlideUnlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.inner.data.borrow();
        f.debug_struct("SlideUnlock")
            .field("succeeded", &data.succeeded)
            .field("nodes", &data.nodes)
            .field("mount", &data.mount)
            .finish()
    }
}

fn listener(weak: &Weak<SlideInner>, f: fn(&SlideUnlock, &Event)) -> EventHandler {
    let weak = weak.clone();
    Rc::new(move |event: &Event| {
        if let Some(inner) = weak.upgrade() {
            f(&SlideUnlock { inner }, event);
        }
    })
}

impl SlideUnlock {
    /// Create a widget for `window`. Nothing is built until [`init`](Self::init).
    pub fn new(window: &Window, options: SlideOptions) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<SlideInner>| SlideInner {
            window: window.clone(),
            options,
            data: RefCell::new(SlideData::default()),
            on_press: listener(weak, SlideUnlock::handle_press),
            on_release: listener(weak, SlideUnlock::handle_release),
        });
        Self { inner }
    }

    pub fn options(&self) -> &SlideOptions {
        &self.inner.options
    }

    pub fn window(&self) -> &Window {
        &self.inner.window
    }

    fn document(&self) -> &Document {
        self.inner.window.document()
    }

    /// Build the track, fill, block and label, and arm the press and release
    /// listeners.
    ///
    /// Calling `init` again tears down the previous build first; a widget that
    /// was mounted is re-inserted into the same mount point.
    pub fn init(&self) {
        let remount = if self.is_initialized() {
            let mount = self.inner.data.borrow().mount;
            self.destroy();
            mount
        } else {
            None
        };

        let doc = self.document();
        let options = &self.inner.options;
        let root = doc.h(
            "div",
            [
                ("class", options.class_name("slide-track")),
                ("style", options.track_style()),
            ],
            None,
        );
        let bg = doc.h("div", [("class", options.class_name("slide-bg"))], None);
        let block = doc.h("div", [("class", options.class_name("slide-block"))], None);
        let text = doc.h(
            "p",
            [("class", options.class_name("slide-text"))],
            Some(options.placeholder.as_str()),
        );
        for child in [bg, block, text] {
            if let Err(err) = doc.append_child(root, child) {
                warn!("failed to build slide widget: {}", err);
                return;
            }
        }

        let nodes = SlideNodes {
            root,
            bg,
            block,
            text,
        };
        {
            let mut data = self.inner.data.borrow_mut();
            data.nodes = Some(nodes);
            data.succeeded = false;
        }
        self.arm(&nodes);
        debug!(prefix = %options.prefix, "slide widget initialized");

        if let Some(mount) = remount {
            self.mount(mount);
        }
    }

    /// Insert the widget as the first child of `target`, an element or a
    /// selector. Does nothing before `init()` or if the target is not found.
    pub fn mount(&self, target: impl Into<Target>) {
        let doc = self.document();
        let target = target.into();
        let el = if target.is_element(doc) || target.is_selector() {
            target.resolve(doc).filter(|id| doc.is_element(*id))
        } else {
            None
        };
        let Some(el) = el else {
            debug!(?target, "mount target not found");
            return;
        };

        let Some(root) = self.root() else {
            return;
        };
        match doc.insert_before(el, root, doc.first_child(el)) {
            Ok(_) => {
                self.inner.data.borrow_mut().mount = Some(el);
                debug!(mount = %el, "slide widget mounted");
            }
            Err(err) => warn!("failed to mount slide widget: {}", err),
        }
    }

    /// Unbind every listener, cancel pending timers and detach the widget.
    ///
    /// The widget can be built again with [`init`](Self::init).
    pub fn destroy(&self) {
        let (nodes, session, rewind) = {
            let mut data = self.inner.data.borrow_mut();
            data.succeeded = false;
            data.mount = None;
            (data.nodes.take(), data.session.take(), data.rewind.take())
        };
        if let Some(id) = rewind {
            self.inner.window.clear_timeout(id);
        }
        let Some(nodes) = nodes else {
            return;
        };
        if let Some(session) = session {
            self.end_session(&nodes, session);
        }
        self.disarm(&nodes);
        self.document().remove(nodes.root);
        debug!("slide widget destroyed");
    }

    pub fn is_succeeded(&self) -> bool {
        self.inner.data.borrow().succeeded
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.data.borrow().nodes.is_some()
    }

    pub fn state(&self) -> SlideState {
        let data = self.inner.data.borrow();
        if data.succeeded {
            SlideState::Succeeded
        } else if data.session.is_some() {
            SlideState::Dragging
        } else if data.rewind.is_some() {
            SlideState::Resetting
        } else {
            SlideState::Idle
        }
    }

    pub fn nodes(&self) -> Option<SlideNodes> {
        self.inner.data.borrow().nodes
    }

    pub fn root(&self) -> Option<NodeId> {
        self.nodes().map(|nodes| nodes.root)
    }

    pub fn mount_point(&self) -> Option<NodeId> {
        self.inner.data.borrow().mount
    }

    /// Client x-coordinate of the active press.
    pub fn drag_origin(&self) -> Option<f64> {
        self.inner
            .data
            .borrow()
            .session
            .as_ref()
            .map(|session| session.down_x)
    }

    pub fn visual(&self) -> Option<VisualSnapshot> {
        let nodes = self.nodes()?;
        Some(VisualSnapshot::read(
            self.document(),
            &nodes,
            &self.inner.options,
        ))
    }

    /// Return a succeeded widget to its locked state. No-op otherwise.
    pub fn reset(&self) {
        let nodes = {
            let mut data = self.inner.data.borrow_mut();
            if !data.succeeded {
                return;
            }
            let Some(nodes) = data.nodes else {
                return;
            };
            data.succeeded = false;
            nodes
        };

        let doc = self.document();
        self.rewind(&nodes);
        Visual::Placeholder {
            block_width: doc.offset_width(nodes.block),
        }
        .apply(doc, &nodes, &self.inner.options);
        self.arm(&nodes);
        debug!("slide widget reset");
    }

    fn arm(&self, nodes: &SlideNodes) {
        let doc = self.document();
        bind_events(doc, nodes.block, PRESS_EVENTS, &self.inner.on_press, false);
        bind_events(doc, Target::Document, RELEASE_EVENTS, &self.inner.on_release, false);
    }

    fn disarm(&self, nodes: &SlideNodes) {
        let doc = self.document();
        unbind_events(doc, nodes.block, PRESS_EVENTS, &self.inner.on_press, false);
        unbind_events(doc, Target::Document, RELEASE_EVENTS, &self.inner.on_release, false);
    }

    fn end_session(&self, nodes: &SlideNodes, session: DragSession) {
        session.mover.cancel();
        unbind_events(
            self.document(),
            nodes.block,
            MOVE_EVENTS,
            &session.mover.listener(),
            false,
        );
    }

    fn rewind(&self, nodes: &SlideNodes) {
        let options = &self.inner.options;
        let duration = options.transition_duration();
        Visual::Rewind { duration }.apply(self.document(), nodes, options);

        let weak = Rc::downgrade(&self.inner);
        let id = self.inner.window.set_timeout(duration, move || {
            if let Some(inner) = weak.upgrade() {
                inner.data.borrow_mut().rewind = None;
                trace!("rewind finished");
            }
        });
        let previous = self.inner.data.borrow_mut().rewind.replace(id);
        if let Some(previous) = previous {
            self.inner.window.clear_timeout(previous);
        }
    }

    fn handle_press(&self, event: &Event) {
        let Some(nodes) = self.nodes() else {
            return;
        };
        let Some(down_x) = event.client_x() else {
            trace!("press without pointer coordinates ignored");
            return;
        };
        if event.cancelable() {
            event.prevent_default();
        }
        if self.is_succeeded() {
            return;
        }

        let (stale, rewind) = {
            let mut data = self.inner.data.borrow_mut();
            (data.session.take(), data.rewind.take())
        };
        if let Some(id) = rewind {
            self.inner.window.clear_timeout(id);
        }
        if let Some(session) = stale {
            self.end_session(&nodes, session);
        }

        let doc = self.document();
        Visual::Grab.apply(doc, &nodes, &self.inner.options);

        let weak = Rc::downgrade(&self.inner);
        let mover = Debounce::new(
            self.inner.window.timers(),
            self.inner.options.move_delay(),
            down_x,
            move |down_x: f64, event: Event| {
                if let Some(inner) = weak.upgrade() {
                    SlideUnlock { inner }.handle_move(down_x, &event);
                }
            },
        );
        bind_events(doc, nodes.block, MOVE_EVENTS, &mover.listener(), false);
        self.inner.data.borrow_mut().session = Some(DragSession { down_x, mover });
        debug!(down_x, "drag started");
    }

    fn handle_move(&self, down_x: f64, event: &Event) {
        if self.is_succeeded() {
            return;
        }
        let Some(nodes) = self.nodes() else {
            return;
        };
        let (Some(x), Some(y)) = (event.client_x(), event.client_y()) else {
            return;
        };
        let doc = self.document();
        let Some(rect) = doc.bounding_client_rect(nodes.block) else {
            return;
        };

        let move_x = x - down_x;
        if move_x < 0.0 {
            return;
        }
        if !rect.contains(x, y) {
            trace!(x, y, "pointer left the block");
            return;
        }

        Visual::Dragging { offset: move_x }.apply(doc, &nodes, &self.inner.options);
        trace!(move_x, "block moved");

        let threshold = doc.offset_width(nodes.root) - rect.width();
        if move_x >= threshold {
            self.succeed(&nodes);
        }
    }

    fn succeed(&self, nodes: &SlideNodes) {
        let doc = self.document();
        self.inner.data.borrow_mut().succeeded = true;
        Visual::Success {
            block_width: doc.offset_width(nodes.block),
        }
        .apply(doc, nodes, &self.inner.options);
        debug!("slide verification succeeded");

        if let Some(callback) = &self.inner.options.success {
            callback.invoke(self);
        }
    }

    fn handle_release(&self, _event: &Event) {
        let Some(nodes) = self.nodes() else {
            return;
        };
        let session = self.inner.data.borrow_mut().session.take();
        let Some(session) = session else {
            return;
        };
        self.end_session(&nodes, session);

        if self.is_succeeded() {
            self.disarm(&nodes);
            debug!("slide widget locked until reset");
            return;
        }
        self.rewind(&nodes);
        debug!("drag released before the end, rewinding");
    }
}
