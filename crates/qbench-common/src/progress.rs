//! Progress indicators for long-running sweeps.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {prefix}";

/// A sweep progress bar. Hidden when output is quiet.
pub struct SweepProgress {
    bar: ProgressBar,
}

impl SweepProgress {
    /// Create a bar over `total` units labelled with `message`.
    pub fn new(total: u64, message: &str, visible: bool) -> Self {
        let bar = ProgressBar::new(total);
        if visible {
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            bar.enable_steady_tick(Duration::from_millis(100));
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// A bar that never draws.
    pub fn hidden(total: u64) -> Self {
        Self::new(total, "", false)
    }

    /// Mark `n` units as already complete (resumed from a checkpoint).
    pub fn skip(&self, n: u64) {
        self.bar.inc(n);
    }

    /// Show the unit currently executing.
    pub fn set_postfix(&self, postfix: String) {
        self.bar.set_prefix(postfix);
    }

    pub fn advance(&self) {
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_counts() {
        let progress = SweepProgress::hidden(10);
        progress.skip(3);
        progress.advance();
        progress.advance();
        assert_eq!(progress.position(), 5);
        progress.finish();
    }
}
