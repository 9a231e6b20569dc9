//! slide-unlock - a draggable "slide to unlock" verification widget.
//!
//! The widget builds a track holding a background fill, a draggable block
//! and a status label. Dragging the block to the right end of the track
//! verifies the interaction; releasing early animates it back.
//!
//! # Quick Start
//!
//! ```ignore
//! use slide_unlock::prelude::*;
//!
//! let window = Window::new();
//! let widget = SlideUnlock::new(
//!     &window,
//!     SlideOptions::new()
//!         .with_width("300px")
//!         .on_success(|widget| println!("unlocked: {}", widget.is_succeeded())),
//! );
//! widget.init();
//! widget.mount("body");
//! ```
//!
//! # Generated structure
//!
//! | Element | Class |
//! |---------|-------|
//! | track (root) | `<prefix>-slide-track` |
//! | background fill | `<prefix>-slide-bg` |
//! | draggable block | `<prefix>-slide-block`, plus `<prefix>-slide-success` once verified |
//! | label | `<prefix>-slide-text` |
//!
//! The host page drives the widget by dispatching pointer events into the
//! [`Document`](slide_core::Document) and advancing its
//! [`Timers`](slide_core::Timers).

pub mod options;
pub mod visual;
pub mod widget;

pub mod prelude {
    //! Common imports for embedding the widget.
    pub use crate::options::{SlideOptions, SuccessCallback};
    pub use crate::visual::VisualSnapshot;
    pub use crate::widget::{SlideNodes, SlideState, SlideUnlock};
    pub use slide_core::{Document, Event, LayoutBox, NodeId, Target, Touch, Window};
}

pub use options::{SlideOptions, SuccessCallback};
pub use visual::{Visual, VisualSnapshot};
pub use widget::{SlideNodes, SlideState, SlideUnlock};

pub use slide_core;
