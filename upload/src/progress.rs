//! Upload progress reporting.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: u64,
    /// Rounded, 0 to 100.
    pub percentage: u8,
}

impl UploadProgress {
    pub fn new(loaded: u64, total: u64) -> Self {
        let loaded = loaded.min(total);
        let percentage = if total == 0 {
            100
        } else {
            ((u128::from(loaded) * 100 + u128::from(total) / 2) / u128::from(total)) as u8
        };
        Self {
            loaded,
            total,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.percentage == 100
    }
}

/// Publishes progress to an optional watch channel. Cheap to clone into the
/// upload body stream.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    tx: Option<Arc<watch::Sender<UploadProgress>>>,
}

impl ProgressReporter {
    pub fn channel() -> (Self, watch::Receiver<UploadProgress>) {
        let (tx, rx) = watch::channel(UploadProgress::default());
        (Self { tx: Some(Arc::new(tx)) }, rx)
    }

    /// A reporter nobody listens to.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn report(&self, loaded: u64, total: u64) {
        if let Some(tx) = &self.tx {
            tx.send_replace(UploadProgress::new(loaded, total));
        }
    }
}
