//! # Ranking
//!
//! Orders each phase's results by latency. Sorts are stable, entries without
//! a latency go last, and ties are broken by the address text so repeated
//! runs over the same data produce the same order.

use std::time::Duration;

use edgeprobe_common::results::{ScanResult, StabilityResult};

/// Sorts phase-1 results by latency, then address.
///
/// Latency is compared in whole milliseconds, the unit of the scan table, so
/// the order survives a write and re-import.
pub fn rank_scan(results: &mut [ScanResult]) {
    results.sort_by_cached_key(|r| (r.latency.as_millis(), r.addr.to_string()));
}

/// Sorts phase-2 results by average latency, then address. Addresses that
/// never answered have no average and sort after all others.
pub fn rank_stability(results: &mut [StabilityResult]) {
    results.sort_by_cached_key(|r| (r.avg.is_none(), r.avg, r.addr.to_string()));
}

/// The recommended addresses: ranked phase-2 entries whose average latency is
/// under `threshold` and that answered at least once.
///
/// Keeps the order of `ranked`. `top` truncates the list.
pub fn shortlist<'a>(
    ranked: &'a [StabilityResult],
    threshold: Duration,
    top: Option<usize>,
) -> Vec<&'a StabilityResult> {
    ranked
        .iter()
        .filter(|r| r.loss_ratio < 1.0)
        .filter(|r| r.avg.is_some_and(|avg| avg < threshold))
        .take(top.unwrap_or(usize::MAX))
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
