#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing shared by the vn-admin binaries.
//!
//! [`init_logger`] installs `pretty_env_logger` behind
//! `indicatif-log-bridge`, so log lines printed during a bulk run are
//! drawn above the progress bars instead of through them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use vn_admin_converter::progress::ProgressCallback;

pub use indicatif::MultiProgress;

const WAITING_TEMPLATE: &str = "{spinner:.cyan} {prefix}: deduplicating addresses";
const RUNNING_TEMPLATE: &str =
    "{prefix} {bar:40.cyan/blue} {pos}/{len} ({per_sec}, {eta} left) {msg}";

/// Progress bar for [`vn_admin_converter::Converter::convert_many`].
///
/// Spins until the unique address count is known, then counts conversions
/// and shows the failure count next to the bar.
pub struct ConversionBar {
    bar: ProgressBar,
    failed: AtomicU64,
}

impl ConversionBar {
    #[must_use]
    pub fn new(multi: &MultiProgress, label: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.set_style(style(WAITING_TEMPLATE));
        bar.set_prefix(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        Arc::new(Self {
            bar,
            failed: AtomicU64::new(0),
        })
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
}

impl ProgressCallback for ConversionBar {
    fn started(&self, unique: u64) {
        self.bar.set_style(style(RUNNING_TEMPLATE).progress_chars("=> "));
        self.bar.set_length(unique);
        self.bar.reset_eta();
    }

    fn converted(&self, address: &str, ok: bool) {
        if !ok {
            let failed = self.failed.fetch_add(1, Ordering::Relaxed) + 1;
            self.bar.set_message(format!("{failed} failed"));
            log::debug!("Conversion failed for '{address}'");
        }
        self.bar.inc(1);
    }

    fn done(&self, converted: u64, failed: u64) {
        self.bar
            .finish_with_message(format!("{converted} converted, {failed} failed"));
    }
}

/// Initializes the global logger (filter from `RUST_LOG`) wrapped in
/// `indicatif-log-bridge`.
///
/// Returns the [`MultiProgress`] every bar must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();
    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let max_level = logger.filter();

    // Fails only if a logger is already installed.
    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(max_level);
    }

    multi
}
