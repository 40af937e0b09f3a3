//! Loading spinner shown while the catalog is fetched.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner handle; a disabled spinner does nothing.
pub(crate) struct LoadingSpinner {
    bar: Option<ProgressBar>,
}

impl LoadingSpinner {
    /// Starts a spinner with `message` when `enabled`.
    pub(crate) fn start(enabled: bool, message: &str) -> Self {
        if !enabled {
            return Self { bar: None };
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    /// Stops and clears the spinner line.
    pub(crate) fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
