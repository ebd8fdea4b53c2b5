use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use once_cell::sync::Lazy;

const BAR_STYLE: &str = "{spinner:.blue} {prefix:>10.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

const SPINNER_STYLE: &str =
    "{spinner:.blue} {prefix:>10.cyan.bold} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const BAR_CHARS: &str = "█▓▒░  ";

static BAR_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(BAR_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK).progress_chars(BAR_CHARS))
});

static SPINNER_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(SPINNER_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK))
});

/// Byte counter rendered on stderr while a body streams in.
pub struct ProgressTracker {
    pb: ProgressBar,
}

impl ProgressTracker {
    pub fn step(&self, len: u64) -> &Self {
        self.pb.inc(len);
        self
    }

    pub fn position(&self) -> u64 {
        self.pb.position()
    }

    pub fn finish(self) {
        self.pb.finish();
    }

    /// Drop the bar from the terminal, used when the transfer fails.
    pub fn abandon(self) {
        self.pb.abandon();
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTrackerBuilder {
    len: Option<u64>,
    prefix: Option<String>,
    hidden: bool,
}

impl ProgressTrackerBuilder {
    pub fn with_len(mut self, len: u64) -> Self {
        self.len = Some(len);
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn build(self) -> ProgressTracker {
        let (pb, style) = match self.len {
            Some(len) => (ProgressBar::new(len), BAR_TEMPLATE.as_ref()),
            None => (ProgressBar::new_spinner(), SPINNER_TEMPLATE.as_ref()),
        };
        let pb = match style {
            Some(style) => pb.with_style(style.clone()),
            None => pb,
        };
        if self.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Some(prefix) = self.prefix {
            pb.set_prefix(prefix);
        }

        ProgressTracker { pb }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_steps() {
        let tracker = ProgressTrackerBuilder::default()
            .with_len(10)
            .with_prefix("test")
            .hidden(true)
            .build();
        tracker.step(3).step(4);
        assert_eq!(tracker.position(), 7);
        tracker.finish();
    }

    #[test]
    fn spinner_without_len() {
        let tracker = ProgressTrackerBuilder::default().hidden(true).build();
        tracker.step(100);
        assert_eq!(tracker.position(), 100);
        tracker.abandon();
    }
}
