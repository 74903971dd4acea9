//! Log-based download progress for non-interactive runs.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use crate::drive::TransferProgress;

/// Logs each 10% step of the current download at `info`.
#[derive(Debug, Default)]
pub struct LogProgress {
    current: Mutex<Option<(String, Option<u64>)>>,
    last_decile: AtomicU64,
}

impl LogProgress {
    /// Creates an idle progress logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransferProgress for LogProgress {
    fn started(&self, file_name: &str, total_bytes: Option<u64>) {
        if let Ok(mut current) = self.current.lock() {
            *current = Some((file_name.to_string(), total_bytes));
        }
        self.last_decile.store(0, Ordering::SeqCst);
    }

    fn advanced(&self, downloaded: u64, total: Option<u64>) {
        let (name, expected) = match self.current.lock() {
            Ok(current) => current
                .as_ref()
                .map(|(name, expected)| (name.clone(), *expected))
                .unwrap_or_default(),
            Err(_) => return,
        };
        let Some(total) = total.or(expected).filter(|total| *total > 0) else {
            return;
        };

        let percent = (downloaded.saturating_mul(100) / total).min(100);
        let decile = percent / 10;
        if decile > self.last_decile.load(Ordering::SeqCst) {
            self.last_decile.store(decile, Ordering::SeqCst);
            info!(name = %name, percent, "Download {percent}%.");
        }
    }

    fn finished(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }
}
