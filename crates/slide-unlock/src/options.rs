//! Widget configuration.

use std::rc::Rc;
use std::time::Duration;

use crate::widget::SlideUnlock;

/// Callback invoked once the block reaches the end of the track.
///
/// Uses `Rc` for `Clone` support. The widget is passed as the receiver.
#[derive(Clone)]
pub struct SuccessCallback(pub Rc<dyn Fn(&SlideUnlock)>);

impl SuccessCallback {
    pub fn new<F: Fn(&SlideUnlock) + 'static>(f: F) -> Self {
        Self(Rc::new(f))
    }

    pub fn invoke(&self, widget: &SlideUnlock) {
        (self.0)(widget)
    }
}

impl std::fmt::Debug for SuccessCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SuccessCallback(...)")
    }
}

/// Options for a [`SlideUnlock`] widget.
#[derive(Debug, Clone)]
pub struct SlideOptions {
    /// Label shown while the widget is locked.
    pub placeholder: String,
    /// Label shown once the block reaches the end.
    pub message: String,
    /// Length of the rewind transition, in milliseconds.
    pub duration: u64,
    /// Class-name namespace. Empty for unprefixed class names.
    pub prefix: String,
    /// Track width as a CSS length. Defaults to `100%`.
    pub width: Option<String>,
    /// Track height as a CSS length.
    pub height: Option<String>,
    /// Quiet period before a burst of moves is processed, in milliseconds.
    pub move_delay: u64,
    pub success: Option<SuccessCallback>,
}

impl Default for SlideOptions {
    fn default() -> Self {
        Self {
            placeholder: String::from("Please drag the slider to the right"),
            message: String::from("Unlock succeeded"),
            duration: 500,
            prefix: String::from("ks"),
            width: None,
            height: None,
            move_delay: 4,
            success: None,
        }
    }
}

impl SlideOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_duration(mut self, millis: u64) -> Self {
        self.duration = millis;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn with_height(mut self, height: impl Into<String>) -> Self {
        self.height = Some(height.into());
        self
    }

    pub fn with_move_delay(mut self, millis: u64) -> Self {
        self.move_delay = millis;
        self
    }

    pub fn on_success<F: Fn(&SlideUnlock) + 'static>(mut self, f: F) -> Self {
        self.success = Some(SuccessCallback::new(f));
        self
    }

    pub fn has_success_callback(&self) -> bool {
        self.success.is_some()
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.duration)
    }

    pub fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_delay)
    }

    /// `name` with the configured prefix, e.g. `ks-slide-block`.
    pub fn class_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}-{}", self.prefix, name)
        }
    }

    /// Inline style of the track element.
    pub(crate) fn track_style(&self) -> String {
        let width = self.width.as_deref().unwrap_or("100%");
        match &self.height {
            Some(height) => format!("width: {width}; height: {height};"),
            None => format!("width: {width};"),
        }
    }
}
