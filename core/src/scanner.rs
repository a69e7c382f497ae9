//! # Scan Scheduler
//!
//! Phase 1 of the pipeline. Samples random addresses from the configured
//! ranges and probes them with at most `concurrency` probes in flight, until
//! `target` probes have succeeded or `max_attempts` have been launched.
//!
//! Failed probes are not retried: a fresh address is sampled instead.
//! Workers hand their replies to the scheduler task over a bounded channel;
//! the scheduler is the only writer of the result collection and enriches
//! each reply with its location on the way in. Once the target is met the
//! outstanding probes are aborted and anything they would have reported is
//! dropped.

use std::net::IpAddr;
use std::sync::Arc;

use edgeprobe_common::config::Config;
use edgeprobe_common::location::LocationTable;
use edgeprobe_common::network::{AddressRange, Sampler};
use edgeprobe_common::results::ScanResult;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::debug;

use crate::probe::{InFlightGauge, ProbeReply, Prober};

/// Called with the number of results collected so far.
pub type ProgressCallback = Box<dyn Fn(usize) + Send + Sync>;

/// What a scan run produced.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Successful probes, in completion order.
    pub results: Vec<ScanResult>,
    /// Probes launched, successful or not.
    pub attempts: usize,
    /// Highest number of probes observed in flight at once.
    pub peak_in_flight: usize,
}

pub struct ScanScheduler<P: Prober + 'static> {
    prober: Arc<P>,
    ranges: Vec<AddressRange>,
    locations: Arc<LocationTable>,
    concurrency: usize,
    target: usize,
    max_attempts: usize,
    on_progress: Option<ProgressCallback>,
}

impl<P: Prober + 'static> ScanScheduler<P> {
    pub fn new(prober: Arc<P>, ranges: Vec<AddressRange>, locations: Arc<LocationTable>) -> Self {
        let defaults = Config::default();
        Self {
            prober,
            ranges,
            locations,
            concurrency: defaults.scan_concurrency,
            target: defaults.sample_target,
            max_attempts: defaults.max_attempts,
            on_progress: None,
        }
    }

    pub fn from_config(
        prober: Arc<P>,
        ranges: Vec<AddressRange>,
        locations: Arc<LocationTable>,
        cfg: &Config,
    ) -> Self {
        Self::new(prober, ranges, locations)
            .concurrency(cfg.scan_concurrency)
            .target(cfg.sample_target)
            .max_attempts(cfg.max_attempts)
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn target(mut self, target: usize) -> Self {
        self.target = target;
        self
    }

    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Runs the scan to completion. Per-probe failures never surface here.
    pub async fn run(self, sampler: &mut Sampler) -> ScanOutcome {
        let mut outcome = ScanOutcome {
            results: Vec::with_capacity(self.target),
            ..ScanOutcome::default()
        };
        if self.target == 0 || self.ranges.is_empty() {
            return outcome;
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let gauge = Arc::new(InFlightGauge::default());
        let (tx, mut rx) = mpsc::channel::<(IpAddr, ProbeReply)>(self.concurrency);
        let mut workers: JoinSet<()> = JoinSet::new();

        while outcome.results.len() < self.target && outcome.attempts < self.max_attempts {
            tokio::select! {
                biased;

                Some((addr, reply)) = rx.recv() => {
                    self.collect(&mut outcome.results, addr, reply);
                }

                permit = Arc::clone(&semaphore).acquire_owned() => {
                    let Ok(permit) = permit else { break };
                    let Some(addr) = sampler.sample_from(&self.ranges) else { break };
                    outcome.attempts += 1;

                    let prober = Arc::clone(&self.prober);
                    let gauge = Arc::clone(&gauge);
                    let tx = tx.clone();
                    workers.spawn(async move {
                        gauge.enter();
                        let result = prober.scan(addr).await;
                        gauge.exit();
                        drop(permit);

                        match result {
                            Ok(reply) => {
                                // The receiver is gone once the target is met.
                                let _ = tx.send((addr, reply)).await;
                            }
                            Err(e) => debug!("{addr}: {e}"),
                        }
                    });
                }
            }

            while workers.try_join_next().is_some() {}
        }

        // Attempt cap reached: wait for the stragglers, they may still succeed.
        drop(tx);
        while outcome.results.len() < self.target {
            match rx.recv().await {
                Some((addr, reply)) => self.collect(&mut outcome.results, addr, reply),
                None => break,
            }
        }

        drop(rx);
        workers.abort_all();
        while workers.join_next().await.is_some() {}

        outcome.peak_in_flight = gauge.peak();
        debug!(
            "scan finished: {} results from {} attempts",
            outcome.results.len(),
            outcome.attempts
        );
        outcome
    }

    fn collect(&self, results: &mut Vec<ScanResult>, addr: IpAddr, reply: ProbeReply) {
        let result = self.enrich(addr, reply);
        debug!(
            "{} {} {}ms",
            result.addr,
            result.datacenter.as_deref().unwrap_or("-"),
            result.latency.as_millis()
        );
        results.push(result);

        if let Some(callback) = &self.on_progress {
            callback(results.len());
        }
    }

    /// Resolves the datacenter code. Unknown codes keep an empty location.
    fn enrich(&self, addr: IpAddr, reply: ProbeReply) -> ScanResult {
        let result = ScanResult::new(addr, reply.latency);
        let Some(code) = reply.datacenter else {
            return result;
        };

        match self.locations.resolve(&code) {
            Some(location) => result
                .with_location(location.region.as_str(), location.city.as_str())
                .with_datacenter(code),
            None => {
                debug!("{addr}: unknown datacenter {code}");
                result.with_datacenter(code)
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
