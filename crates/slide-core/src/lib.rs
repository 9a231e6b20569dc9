//! Core types for the slide-unlock widget: an in-process document, an event
//! bridge, timers and debounced handlers.

pub mod dom;
pub mod events;
pub mod perf;
pub mod selector;
pub mod timer;
pub mod window;

pub use dom::{ClassList, Document, DomError, LayoutBox, NodeId, NodeType, Rect, Style};
pub use events::{
    bind_events, unbind_events, Event, EventHandler, ListenerOptions, PointerData, Target, Touch,
};
pub use perf::Debounce;
pub use selector::{SelectorError, SelectorList};
pub use timer::{TimerId, Timers};
pub use window::Window;
