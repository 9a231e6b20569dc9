//! Visual states of the widget and the style mutations that realize them.
//!
//! Every style, text or class change the widget makes goes through
//! [`Visual::apply`], and [`VisualSnapshot`] reads the result back.

use std::time::Duration;

use slide_core::dom::{parse_px, px};
use slide_core::Document;

use crate::options::SlideOptions;
use crate::widget::SlideNodes;

/// A visual change applied to the widget's nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Visual {
    /// Drop any transition so the block tracks the pointer directly.
    Grab,
    /// Block offset and fill width follow the drag distance.
    Dragging { offset: f64 },
    /// Animate block and fill back to the start.
    Rewind { duration: Duration },
    /// Success label and class.
    Success { block_width: f64 },
    /// Placeholder label, success class removed.
    Placeholder { block_width: f64 },
}

impl Visual {
    pub fn apply(&self, doc: &Document, nodes: &SlideNodes, options: &SlideOptions) {
        match *self {
            Visual::Grab => {
                doc.set_style_property(nodes.bg, "transition", "");
                doc.set_style_property(nodes.block, "transition", "");
            }
            Visual::Dragging { offset } => {
                doc.set_style_property(nodes.block, "left", &px(offset));
                doc.set_style_property(nodes.bg, "width", &px(offset));
            }
            Visual::Rewind { duration } => {
                let ms = duration.as_millis();
                doc.set_css_text(nodes.bg, &format!("transition: width {ms}ms ease; width: 0;"));
                doc.set_css_text(nodes.block, &format!("transition: left {ms}ms ease; left: 0;"));
            }
            Visual::Success { block_width } => {
                doc.set_text_content(nodes.text, &options.message);
                doc.set_css_text(
                    nodes.text,
                    &format!("color: #fff; left: 0; right: {};", px(block_width)),
                );
                doc.add_class(nodes.block, &options.class_name("slide-success"));
            }
            Visual::Placeholder { block_width } => {
                doc.set_css_text(
                    nodes.text,
                    &format!("color: #5f5f5f; left: {}; right: 0;", px(block_width)),
                );
                doc.set_text_content(nodes.text, &options.placeholder);
                doc.remove_class(nodes.block, &options.class_name("slide-success"));
            }
        }
    }
}

/// What the widget currently looks like.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualSnapshot {
    pub block_left: f64,
    pub bg_width: f64,
    pub block_transition: Option<String>,
    pub bg_transition: Option<String>,
    pub label: String,
    pub label_style: String,
    pub success: bool,
}

impl VisualSnapshot {
    pub fn read(doc: &Document, nodes: &SlideNodes, options: &SlideOptions) -> Self {
        let length = |node, prop| {
            doc.style_property(node, prop)
                .as_deref()
                .and_then(parse_px)
                .unwrap_or(0.0)
        };
        Self {
            block_left: length(nodes.block, "left"),
            bg_width: length(nodes.bg, "width"),
            block_transition: doc.style_property(nodes.block, "transition"),
            bg_transition: doc.style_property(nodes.bg, "transition"),
            label: doc.text_content(nodes.text),
            label_style: doc.css_text(nodes.text),
            success: doc.has_class(nodes.block, &options.class_name("slide-success")),
        }
    }
}
