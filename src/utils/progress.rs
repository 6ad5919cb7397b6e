//! Progress bar utilities for the merge command.
//!
//! indicatif hides its output when stderr is not a terminal, so these are
//! safe to use in scripts and pipes.

use crate::constants::SPINNER_CHARS;
use crate::merge::MergeObserver;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Create a standard progress bar with consistent styling.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_strings(SPINNER_CHARS)
            .progress_chars("█▓░"),
    );
    pb
}

/// Drives a progress bar from pipeline events.
pub struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    pub fn new(total_inputs: usize) -> Self {
        Self {
            bar: create_progress_bar(total_inputs as u64),
        }
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl MergeObserver for BarObserver {
    fn decoding(&self, index: usize, _total: usize, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_position(index as u64);
        self.bar.set_message(format!("Decoding {name}"));
    }

    fn encoding(&self) {
        self.bar.set_position(self.bar.length().unwrap_or(0));
        self.bar.set_message("Encoding MP3...");
        self.bar.enable_steady_tick(std::time::Duration::from_millis(100));
    }

    fn finished(&self) {
        self.bar.finish_and_clear();
    }
}
