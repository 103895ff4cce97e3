//! Console progress rendering.
//!
//! Purely cosmetic: the bar is a per-file value created by the session and
//! fed through the [`TransferObserver`] seam, never process-wide state, so
//! parallel test sessions cannot interfere with each other. On a non-tty
//! diagnostic stream indicatif draws nothing.

use indicatif::{ProgressBar, ProgressStyle};

use crate::transfer::TransferObserver;

/// Progress bar for a single file transfer.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(file_name: &str, file_size: u64) -> Self {
        let bar = ProgressBar::new(file_size);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:<30!} {bytes:>10} [{bar:22}] {percent:>3}%")
                .expect("progress bar template is static")
                .progress_chars("#--"),
        );
        bar.set_message(file_name.to_string());
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Leave the bar on screen unfinished; used when a copy aborts.
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl TransferObserver for ProgressReporter {
    fn on_progress(&mut self, bytes_so_far: u64) {
        self.bar.set_position(bytes_so_far);
    }
}
