//! Glue between the phases: picking phase-2 candidates from a phase-1
//! collection (fresh or loaded from disk), and the summaries printed along
//! the way.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::time::Duration;

use edgeprobe_common::error::InsufficientCandidates;
use edgeprobe_common::results::{ScanResult, StabilityResult};

/// Phase-1 survivors chosen for the stability test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    pub addrs: Vec<IpAddr>,
}

impl Candidates {
    /// Picks every result under `threshold`, optionally limited to one
    /// datacenter (compared case-insensitively). Order follows `results`.
    ///
    /// Each address appears once, at its first occurrence, so a ranked input
    /// keeps its fastest sighting.
    pub fn select(results: &[ScanResult], threshold: Duration, datacenter: Option<&str>) -> Self {
        let mut seen: HashSet<IpAddr> = HashSet::new();
        let addrs = results
            .iter()
            .filter(|r| r.latency < threshold)
            .filter(|r| match datacenter {
                Some(wanted) => r
                    .datacenter
                    .as_deref()
                    .is_some_and(|code| code.eq_ignore_ascii_case(wanted)),
                None => true,
            })
            .map(|r| r.addr)
            .filter(|addr| seen.insert(*addr))
            .collect();
        Self { addrs }
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// `Some` when fewer than `wanted` candidates were found.
    pub fn shortfall(&self, wanted: usize) -> Option<InsufficientCandidates> {
        (self.addrs.len() < wanted).then_some(InsufficientCandidates {
            found: self.addrs.len(),
            wanted,
        })
    }
}

/// Per-datacenter roll-up of a phase-1 collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatacenterSummary {
    pub code: String,
    pub city: String,
    pub count: usize,
    pub min_latency: Duration,
}

/// Groups phase-1 results by datacenter code, fastest datacenter first.
/// Results without a code are left out.
pub fn summarize_datacenters(results: &[ScanResult]) -> Vec<DatacenterSummary> {
    let mut by_code: HashMap<&str, DatacenterSummary> = HashMap::new();

    for result in results {
        let Some(code) = result.datacenter.as_deref() else {
            continue;
        };
        by_code
            .entry(code)
            .and_modify(|summary| {
                summary.count += 1;
                summary.min_latency = summary.min_latency.min(result.latency);
            })
            .or_insert_with(|| DatacenterSummary {
                code: code.to_string(),
                city: result.city.clone(),
                count: 1,
                min_latency: result.latency,
            });
    }

    let mut summaries: Vec<DatacenterSummary> = by_code.into_values().collect();
    summaries.sort_by(|a, b| {
        a.min_latency
            .cmp(&b.min_latency)
            .then_with(|| a.code.cmp(&b.code))
    });
    summaries
}

/// One 10%-wide loss bucket of the phase-2 histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct LossBucket {
    /// Lower bound in percent: 0, 10, ..., 90, or 100 for total loss.
    pub floor: u8,
    pub count: usize,
    /// Share of all tested addresses, in percent.
    pub share: f64,
    /// Mean of the bucket's minimum latencies. `None` for empty buckets
    /// and for the 100% bucket.
    pub mean_min_latency: Option<Duration>,
}

/// Buckets phase-2 results by loss ratio in 10% steps.
pub fn loss_histogram(results: &[StabilityResult]) -> Vec<LossBucket> {
    let total = results.len();
    let mut mins: Vec<Vec<Duration>> = vec![Vec::new(); 10];
    let mut lost = 0usize;

    for result in results {
        match result.min {
            Some(min) if result.loss_ratio < 1.0 => {
                let idx = ((result.loss_ratio * 10.0).floor() as usize).min(9);
                mins[idx].push(min);
            }
            _ => lost += 1,
        }
    }

    let share = |count: usize| match total {
        0 => 0.0,
        n => count as f64 / n as f64 * 100.0,
    };

    let mut buckets: Vec<LossBucket> = mins
        .iter()
        .enumerate()
        .map(|(idx, bucket)| LossBucket {
            floor: (idx * 10) as u8,
            count: bucket.len(),
            share: share(bucket.len()),
            mean_min_latency: match bucket.len() {
                0 => None,
                n => Some(bucket.iter().sum::<Duration>() / n as u32),
            },
        })
        .collect();

    buckets.push(LossBucket {
        floor: 100,
        count: lost,
        share: share(lost),
        mean_min_latency: None,
    });
    buckets
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
