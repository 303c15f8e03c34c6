//! Progress callbacks for a conversion run.
//!
//! The controller reports every settled item to a [`ProgressObserver`]; the
//! CLI forwards these events to a terminal progress bar. All methods have
//! no-op defaults so implementations only override what they need.

use crate::models::ConversionResult;
use crate::Error;

pub trait ProgressObserver: Send + Sync {
    /// Called once before the first request of a run is sent.
    fn on_run_start(&self, total: usize) {
        let _ = total;
    }

    /// Called after an item converted successfully.
    ///
    /// `progress` is `completed / total * 100`.
    fn on_item_converted(
        &self,
        completed: usize,
        total: usize,
        progress: f64,
        result: &ConversionResult,
    ) {
        let _ = (completed, total, progress, result);
    }

    /// Called after an item failed. The run continues with the next item.
    fn on_item_failed(
        &self,
        completed: usize,
        total: usize,
        progress: f64,
        name: &str,
        error: &Error,
    ) {
        let _ = (completed, total, progress, name, error);
    }

    fn on_run_complete(&self, results: &[ConversionResult]) {
        let _ = results;
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {}
