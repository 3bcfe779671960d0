//! Progress display for dependency analysis
//!
//! Provides visual feedback during a batch run using indicatif.

use crate::domain::ProgressEvent;
use crate::orchestrator::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for a batch run
pub struct Progress {
    /// Current progress bar, absent when display is disabled
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Create a progress bar for `total` dependencies; the length follows
    /// the batch's own count once events arrive.
    ///
    /// Nothing is drawn when `enabled` is false (quiet or JSON output).
    pub fn new(enabled: bool, total: u64, message: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len} ({eta})")
        {
            bar.set_style(style.progress_chars("█▓▒░"));
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar: Some(bar) }
    }

    /// Create a disabled progress reporter
    pub fn disabled() -> Self {
        Self { bar: None }
    }

    /// Finish and clear the current progress bar
    pub fn finish_and_clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for Progress {
    fn on_progress(&self, event: &ProgressEvent) {
        if let Some(ref bar) = self.bar {
            bar.set_length(event.total as u64);
            bar.set_position(event.analyzed as u64);
            bar.set_message(format!(
                "{} outdated, {} major, {} failed",
                event.tallies.outdated, event.tallies.major_update, event.tallies.failed
            ));
        }
    }
}
