//! End-to-end drag scenarios driven through event dispatch and virtual time.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use slide_unlock::prelude::*;

const Y: f64 = 30.0;

struct Harness {
    window: Window,
    widget: SlideUnlock,
    nodes: SlideNodes,
    calls: Rc<Cell<u32>>,
}

/// A 300px track at x=75 holding a 50px block, so the success threshold is 250px.
fn harness_with(options: SlideOptions) -> Harness {
    let window = Window::new();
    let calls = Rc::new(Cell::new(0));
    let calls_clone = Rc::clone(&calls);
    let widget = SlideUnlock::new(
        &window,
        options.with_width("300px").on_success(move |widget| {
            assert!(widget.is_succeeded());
            assert!(widget.visual().is_some_and(|v| v.success));
            calls_clone.set(calls_clone.get() + 1);
        }),
    );
    widget.init();
    widget.mount("body");

    let nodes = widget.nodes().unwrap();
    let doc = window.document();
    doc.set_layout(nodes.root, LayoutBox::new(75.0, 10.0, 300.0, 40.0));
    doc.set_layout(nodes.block, LayoutBox::new(0.0, 0.0, 50.0, 40.0));

    Harness {
        window,
        widget,
        nodes,
        calls,
    }
}

fn harness() -> Harness {
    harness_with(SlideOptions::new())
}

impl Harness {
    fn doc(&self) -> &Document {
        self.window.document()
    }

    fn advance(&self, ms: u64) {
        self.window.timers().advance(Duration::from_millis(ms));
    }

    /// Returns `false` if the press was default-prevented.
    fn press(&self, x: f64) -> bool {
        self.doc()
            .dispatch_event(self.nodes.block, &Event::mouse("mousedown", x, Y))
    }

    /// Dispatch a move without letting the debounce fire.
    fn hover(&self, x: f64, y: f64) {
        self.doc()
            .dispatch_event(self.nodes.block, &Event::mouse("mousemove", x, y));
    }

    fn move_to(&self, x: f64) {
        self.hover(x, Y);
        self.advance(4);
    }

    /// Move in 10px steps so the pointer never outruns the block.
    fn drag(&self, from: u32, to: u32) {
        for x in (from + 10..=to).step_by(10) {
            self.move_to(x as f64);
        }
    }

    fn release(&self) {
        self.doc()
            .dispatch_event(self.nodes.block, &Event::mouse("mouseup", 0.0, 0.0));
    }

    fn visual(&self) -> VisualSnapshot {
        self.widget.visual().unwrap()
    }
}

#[test]
fn test_drag_to_threshold_succeeds_once() {
    let h = harness();
    h.press(100.0);
    h.drag(100, 340);

    assert_eq!(h.widget.state(), SlideState::Dragging);
    assert!(!h.widget.is_succeeded());
    assert_eq!(h.visual().block_left, 240.0);
    assert_eq!(h.visual().bg_width, 240.0);
    assert_eq!(h.calls.get(), 0);

    h.move_to(351.0);
    assert!(h.widget.is_succeeded());
    assert_eq!(h.widget.state(), SlideState::Succeeded);
    assert_eq!(h.calls.get(), 1);

    let visual = h.visual();
    assert_eq!(visual.block_left, 251.0);
    assert_eq!(visual.label, "Unlock succeeded");
    assert_eq!(visual.label_style, "color: #fff; left: 0; right: 50px;");
    assert!(visual.success);

    h.move_to(360.0);
    assert_eq!(h.calls.get(), 1);
    assert_eq!(h.visual().block_left, 251.0);
}

#[test]
fn test_release_after_success_locks_widget() {
    let h = harness();
    h.press(100.0);
    h.drag(100, 350);
    assert!(h.widget.is_succeeded());

    h.release();
    assert_eq!(h.doc().listener_count(h.nodes.block), 0);
    assert_eq!(h.doc().listener_count(h.doc().document_node()), 0);
    assert_eq!(h.visual().block_left, 250.0);
    assert_eq!(h.visual().block_transition, None);

    assert!(h.press(100.0));
    h.drag(100, 150);
    assert_eq!(h.widget.state(), SlideState::Succeeded);
    assert_eq!(h.calls.get(), 1);
}

#[test]
fn test_press_while_succeeded_is_ignored() {
    let h = harness();
    h.press(100.0);
    h.drag(100, 350);

    assert!(!h.press(100.0));
    assert_eq!(h.widget.state(), SlideState::Succeeded);
    assert_eq!(h.widget.drag_origin(), Some(100.0));
}

#[test]
fn test_release_early_rewinds() {
    let h = harness_with(SlideOptions::new().with_duration(300));
    h.press(100.0);
    h.drag(100, 200);
    assert_eq!(h.visual().bg_width, 100.0);

    h.release();
    let visual = h.visual();
    assert_eq!(visual.block_left, 0.0);
    assert_eq!(visual.bg_width, 0.0);
    assert_eq!(visual.bg_transition.as_deref(), Some("width 300ms ease"));
    assert_eq!(visual.block_transition.as_deref(), Some("left 300ms ease"));
    assert_eq!(h.widget.state(), SlideState::Resetting);
    assert!(!h.widget.is_succeeded());

    h.advance(299);
    assert_eq!(h.widget.state(), SlideState::Resetting);
    h.advance(1);
    assert_eq!(h.widget.state(), SlideState::Idle);
    assert_eq!(h.doc().listener_count(h.nodes.block), 2);
}

#[test]
fn test_release_outside_block_still_resolves() {
    let h = harness();
    h.press(100.0);
    h.drag(100, 150);

    let body = h.doc().body();
    h.doc()
        .dispatch_event(body, &Event::mouse("mouseup", 600.0, 300.0));
    assert_eq!(h.widget.state(), SlideState::Resetting);
    assert_eq!(h.visual().block_left, 0.0);
}

#[test]
fn test_press_clears_transition() {
    let h = harness();
    h.press(100.0);
    h.drag(100, 150);
    h.release();
    assert!(h.visual().block_transition.is_some());

    h.press(100.0);
    assert_eq!(h.widget.state(), SlideState::Dragging);
    assert_eq!(h.visual().block_transition, None);
    assert_eq!(h.visual().bg_transition, None);

    h.advance(500);
    assert_eq!(h.widget.state(), SlideState::Dragging);
}

#[test]
fn test_backward_move_ignored() {
    let h = harness();
    h.press(100.0);
    h.move_to(120.0);
    assert_eq!(h.visual().block_left, 20.0);

    h.move_to(90.0);
    assert_eq!(h.visual().block_left, 20.0);
    assert_eq!(h.visual().bg_width, 20.0);
}

#[test]
fn test_pointer_outside_block_ignored() {
    let h = harness();
    h.press(100.0);

    h.move_to(200.0);
    assert_eq!(h.visual().block_left, 0.0);

    h.hover(110.0, 80.0);
    h.advance(4);
    assert_eq!(h.visual().block_left, 0.0);

    h.move_to(110.0);
    assert_eq!(h.visual().block_left, 10.0);
}

#[test]
fn test_move_burst_collapses() {
    let h = harness();
    h.press(100.0);
    h.hover(105.0, Y);
    h.hover(110.0, Y);
    h.hover(115.0, Y);
    assert_eq!(h.visual().block_left, 0.0);
    assert_eq!(h.window.timers().pending_count(), 1);

    h.advance(4);
    assert_eq!(h.visual().block_left, 15.0);
}

#[test]
fn test_release_drops_pending_move() {
    let h = harness();
    h.press(100.0);
    h.move_to(110.0);
    h.hover(120.0, Y);
    h.release();
    h.advance(600);

    assert_eq!(h.visual().block_left, 0.0);
    assert_eq!(h.widget.state(), SlideState::Idle);
    assert_eq!(h.window.timers().pending_count(), 0);
    assert_eq!(h.doc().listener_count(h.nodes.block), 2);
}

#[test]
fn test_press_prevents_default() {
    let h = harness();
    assert!(!h.press(100.0));

    h.release();
    let event = Event::mouse("mousedown", 100.0, Y).with_cancelable(false);
    assert!(h.doc().dispatch_event(h.nodes.block, &event));
    assert_eq!(h.widget.state(), SlideState::Dragging);
}

#[test]
fn test_second_press_replaces_session() {
    let h = harness();
    h.press(100.0);
    h.move_to(110.0);
    h.press(110.0);

    assert_eq!(h.doc().listener_count(h.nodes.block), 4);
    assert_eq!(h.widget.drag_origin(), Some(110.0));
}

#[test]
fn test_touch_drag() {
    let h = harness();
    let touch = |kind: &str, x: f64| Event::touch(kind, vec![Touch::new(0, x, Y)]);

    assert!(!h.doc().dispatch_event(h.nodes.block, &touch("touchstart", 100.0)));
    for x in (110..=350).step_by(10) {
        h.doc().dispatch_event(h.nodes.block, &touch("touchmove", x as f64));
        h.advance(4);
    }
    assert!(h.widget.is_succeeded());
    assert_eq!(h.calls.get(), 1);

    h.doc().dispatch_event(h.nodes.block, &touch("touchend", 350.0));
    assert_eq!(h.doc().listener_count(h.nodes.block), 0);
}

#[test]
fn test_reset_when_not_succeeded_is_noop() {
    let h = harness();
    let idle = h.visual();
    h.widget.reset();
    assert_eq!(h.visual(), idle);
    assert_eq!(h.widget.state(), SlideState::Idle);
    assert_eq!(h.window.timers().pending_count(), 0);

    h.press(100.0);
    h.move_to(150.0);
    let dragging = h.visual();
    h.widget.reset();
    assert_eq!(h.visual(), dragging);
    assert_eq!(h.widget.state(), SlideState::Dragging);
}

#[test]
fn test_reset_rearms_widget() {
    let h = harness();
    h.press(100.0);
    h.drag(100, 350);
    h.release();

    h.widget.reset();
    assert!(!h.widget.is_succeeded());
    assert_eq!(h.widget.state(), SlideState::Resetting);

    let visual = h.visual();
    assert_eq!(visual.label, "Please drag the slider to the right");
    assert_eq!(visual.label_style, "color: #5f5f5f; left: 50px; right: 0;");
    assert!(!visual.success);
    assert_eq!(visual.block_left, 0.0);
    assert_eq!(visual.bg_transition.as_deref(), Some("width 500ms ease"));
    assert_eq!(h.doc().listener_count(h.nodes.block), 2);
    assert_eq!(h.doc().listener_count(h.doc().document_node()), 2);

    h.advance(500);
    assert_eq!(h.widget.state(), SlideState::Idle);

    h.press(100.0);
    h.drag(100, 350);
    assert!(h.widget.is_succeeded());
    assert_eq!(h.calls.get(), 2);
}

#[test]
fn test_label_updates_reuse_text_node() {
    let h = harness();
    let label = h.doc().first_child(h.nodes.text);
    assert!(label.is_some());

    for _ in 0..3 {
        h.press(100.0);
        h.drag(100, 350);
        h.release();
        assert_eq!(h.doc().first_child(h.nodes.text), label);
        h.widget.reset();
        h.advance(500);
        assert_eq!(h.doc().children(h.nodes.text), label.into_iter().collect::<Vec<_>>());
    }
    assert_eq!(h.calls.get(), 3);
}

#[test]
fn test_callback_can_reset_widget() {
    let window = Window::new();
    let widget = SlideUnlock::new(
        &window,
        SlideOptions::new()
            .with_width("300px")
            .with_message("Verified")
            .on_success(|widget| widget.reset()),
    );
    widget.init();
    widget.mount("body");
    let nodes = widget.nodes().unwrap();
    let doc = window.document();
    doc.set_layout(nodes.block, LayoutBox::new(0.0, 0.0, 50.0, 40.0));

    doc.dispatch_event(nodes.block, &Event::mouse("mousedown", 25.0, 20.0));
    for x in (35..=275).step_by(10) {
        doc.dispatch_event(nodes.block, &Event::mouse("mousemove", x as f64, 20.0));
        window.timers().advance(Duration::from_millis(4));
    }

    assert!(!widget.is_succeeded());
    assert_eq!(doc.text_content(nodes.text), "Please drag the slider to the right");
}
