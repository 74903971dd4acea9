//! Progress bar for interactive download runs.

use std::sync::Mutex;

use harvester_core::TransferProgress;
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{msg} [{bar:30}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Renders one `indicatif` bar per file on stderr.
#[derive(Debug, Default)]
pub(crate) struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl TransferProgress for BarProgress {
    fn started(&self, file_name: &str, total_bytes: Option<u64>) {
        let bar = match total_bytes {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::new_spinner(),
        };
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_message(file_name.to_string());
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn advanced(&self, downloaded: u64, total: Option<u64>) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                if let Some(total) = total {
                    bar.set_length(total);
                }
                bar.set_position(downloaded);
            }
        }
    }

    fn finished(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_progress_lifecycle() {
        let progress = BarProgress::new();
        progress.started("a.bin", Some(100));
        progress.advanced(40, Some(100));
        {
            let slot = progress.bar.lock().unwrap();
            assert_eq!(slot.as_ref().unwrap().position(), 40);
        }
        progress.finished();
        assert!(progress.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_bar_progress_ignores_updates_when_idle() {
        let progress = BarProgress::new();
        progress.advanced(10, None);
        progress.finished();
        assert!(progress.bar.lock().unwrap().is_none());
    }
}
