//! slide-demo - drives a slide-unlock widget through a scripted drag.
//!
//! The page's timers are pumped from a tokio clock, so the move debounce and
//! the rewind transition run in real time. The script first releases early
//! (the block rewinds), then drags to the end, then resets the widget.

use std::time::Duration;

use slide_unlock::prelude::*;
use tokio::time::{sleep, Instant};

/// Pointer row the script drags along, inside the block.
const Y: f64 = 40.0;

/// One scripted action.
#[derive(Debug, Clone, Copy)]
enum Step {
    Press(f64),
    Move(f64),
    Release,
    Wait(u64),
}

fn drag(from: f64, to: f64, stride: f64) -> Vec<Step> {
    let mut steps = vec![Step::Press(from)];
    let mut x = from;
    while x < to {
        x = (x + stride).min(to);
        steps.push(Step::Move(x));
    }
    steps.push(Step::Release);
    steps
}

/// Advance the page's timers by the real time elapsed since the last pump.
fn pump(window: &Window, clock: &mut Instant) {
    let now = Instant::now();
    window.timers().advance(now - *clock);
    *clock = now;
}

fn perform(doc: &Document, block: NodeId, step: Step) {
    let event = match step {
        Step::Press(x) => Event::mouse("mousedown", x, Y),
        Step::Move(x) => Event::mouse("mousemove", x, Y),
        Step::Release => Event::mouse("mouseup", 0.0, 0.0),
        Step::Wait(_) => return,
    };
    doc.dispatch_event(block, &event);
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = tracing_subscriber::fmt::try_init();

    let window = Window::new();
    let doc = window.document().clone();
    let app = doc.h("div", [("id", "app")], None);
    if let Err(err) = doc.append_child(doc.body(), app) {
        tracing::error!("failed to build page: {}", err);
        return;
    }

    let options = SlideOptions::new()
        .with_width("300px")
        .with_height("40px")
        .with_message("Verified")
        .on_success(|widget| {
            tracing::info!(state = ?widget.state(), "verification passed");
        });
    let rewind = options.transition_duration();
    let widget = SlideUnlock::new(&window, options);
    widget.init();
    widget.mount("#app");

    let Some(nodes) = widget.nodes() else {
        tracing::error!("widget was not built");
        return;
    };
    doc.set_layout(nodes.root, LayoutBox::new(20.0, 20.0, 300.0, 40.0));
    doc.set_layout(nodes.block, LayoutBox::new(0.0, 0.0, 40.0, 40.0));

    let mut script = drag(40.0, 140.0, 8.0);
    script.push(Step::Wait(rewind.as_millis() as u64));
    script.extend(drag(40.0, 310.0, 8.0));

    let frame = Duration::from_millis(16);
    let mut clock = Instant::now();
    for step in script {
        match step {
            Step::Wait(ms) => sleep(Duration::from_millis(ms)).await,
            _ => sleep(frame).await,
        }
        pump(&window, &mut clock);
        perform(&doc, nodes.block, step);
        tracing::debug!(?step, state = ?widget.state());
    }

    println!("{}", doc.outer_html(app));

    widget.reset();
    sleep(rewind + frame).await;
    pump(&window, &mut clock);
    tracing::info!(state = ?widget.state(), "widget reset");
    println!("{}", doc.outer_html(app));
}
