//! Progress reporting using indicatif.
//!
//! [`Progress`] implements [`ProgressCallback`] and draws one bar per phase
//! on stderr. Phases run one after another, so only one bar is live at a
//! time; hashing workers report from several threads at once and each call
//! advances the bar by one.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Receives progress events from the duplicate-finding stages.
///
/// Phase names are `"walking"`, `"partial"`, `"fullhash"` and `"verify"`.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts. `total` is 0 when unknown.
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called once per item, possibly from several threads.
    ///
    /// `current` is the 1-based position of the item in its batch, not a
    /// completion count.
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

struct ActiveBar {
    phase: String,
    bar: ProgressBar,
}

/// Terminal progress reporter.
pub struct Progress {
    multi: MultiProgress,
    active: Mutex<Option<ActiveBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a reporter. A quiet reporter draws nothing.
    ///
    /// ```
    /// use dupefind::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            active: Mutex::new(None),
            quiet,
        }
    }

    // A panicking worker must not take the progress display down with it.
    fn active(&self) -> MutexGuard<'_, Option<ActiveBar>> {
        self.active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn label(phase: &str) -> &'static str {
        match phase {
            "walking" => "Walking",
            "partial" => "Partial hashing",
            "fullhash" => "Full hashing",
            "verify" => "Verifying",
            _ => "Working",
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let bar = if total == 0 {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            let pb = self.multi.add(ProgressBar::new(total as u64));
            pb.set_style(Self::bar_style());
            pb
        };
        bar.set_message(Self::label(phase));

        let previous = self.active().replace(ActiveBar {
            phase: phase.to_string(),
            bar,
        });
        if let Some(stale) = previous {
            stale.bar.finish_and_clear();
        }
    }

    fn on_progress(&self, _current: usize, path: &str) {
        if self.quiet {
            return;
        }

        if let Some(active) = self.active().as_ref() {
            active.bar.inc(1);
            active.bar.set_message(truncate_path(path, 30));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let mut active = self.active();
        if active.as_ref().is_some_and(|a| a.phase == phase) {
            if let Some(done) = active.take() {
                done.bar
                    .finish_with_message(format!("{} complete", Self::label(phase)));
            }
        }
    }
}

/// Shorten a path to its file name when it is longer than `max_len`.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(name_len.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
