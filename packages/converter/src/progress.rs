//! Progress reporting for bulk conversion.
//!
//! [`Converter::convert_many`](crate::Converter::convert_many) emits one
//! event per unique address, so binaries can drive a progress bar while
//! tests and library callers stay silent.

use std::sync::Arc;

/// Receives conversion events. Called from concurrent conversions.
pub trait ProgressCallback: Send + Sync {
    /// Deduplication is done and `unique` addresses will be converted.
    fn started(&self, unique: u64);

    /// One address finished, successfully or not.
    fn converted(&self, address: &str, ok: bool);

    /// Every address finished.
    fn done(&self, converted: u64, failed: u64);
}

/// Ignores every event.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn started(&self, _unique: u64) {}
    fn converted(&self, _address: &str, _ok: bool) {}
    fn done(&self, _converted: u64, _failed: u64) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
