//! # Stability Tester
//!
//! Phase 2 of the pipeline. Every candidate gets `attempts` connection
//! attempts, one after another so an address never competes with itself;
//! up to `concurrency` addresses are tested at once. There is no early
//! cut-off: partial statistics for an address would be misleading.

use std::net::IpAddr;
use std::sync::Arc;

use edgeprobe_common::config::Config;
use edgeprobe_common::results::{StabilityResult, StabilitySample};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::probe::{InFlightGauge, Prober};
use crate::scanner::ProgressCallback;

pub struct StabilityTester<P: Prober + 'static> {
    prober: Arc<P>,
    attempts: usize,
    concurrency: usize,
    gauge: Arc<InFlightGauge>,
    on_progress: Option<ProgressCallback>,
}

impl<P: Prober + 'static> StabilityTester<P> {
    pub fn new(prober: Arc<P>) -> Self {
        let defaults = Config::default();
        Self {
            prober,
            attempts: defaults.test_attempts,
            concurrency: defaults.test_concurrency,
            gauge: Arc::new(InFlightGauge::default()),
            on_progress: None,
        }
    }

    pub fn from_config(prober: Arc<P>, cfg: &Config) -> Self {
        Self::new(prober)
            .attempts(cfg.test_attempts)
            .concurrency(cfg.test_concurrency)
    }

    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Highest number of addresses observed under test at once.
    pub fn peak_in_flight(&self) -> usize {
        self.gauge.peak()
    }

    /// Tests every candidate. Results come back in completion order.
    pub async fn run(&self, candidates: Vec<IpAddr>) -> Vec<StabilityResult> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut workers: JoinSet<StabilityResult> = JoinSet::new();
        let mut results = Vec::with_capacity(candidates.len());

        for addr in candidates {
            // Acquire before spawning so at most `concurrency` tasks exist.
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let prober = Arc::clone(&self.prober);
            let gauge = Arc::clone(&self.gauge);
            let attempts = self.attempts;

            workers.spawn(async move {
                gauge.enter();
                let result = test_address(prober.as_ref(), addr, attempts).await;
                gauge.exit();
                drop(permit);
                result
            });

            while let Some(joined) = workers.try_join_next() {
                self.collect(&mut results, joined);
            }
        }

        while let Some(joined) = workers.join_next().await {
            self.collect(&mut results, joined);
        }

        results
    }

    fn collect(
        &self,
        results: &mut Vec<StabilityResult>,
        joined: Result<StabilityResult, tokio::task::JoinError>,
    ) {
        match joined {
            Ok(result) => {
                debug!(
                    "{}: {} of {} attempts answered",
                    result.addr, result.successes, result.attempts
                );
                results.push(result);
                if let Some(callback) = &self.on_progress {
                    callback(results.len());
                }
            }
            Err(e) => error!("stability worker failed: {e}"),
        }
    }
}

/// Runs `attempts` sequential pings against one address and folds them.
pub async fn test_address<P: Prober + ?Sized>(
    prober: &P,
    addr: IpAddr,
    attempts: usize,
) -> StabilityResult {
    let mut samples: Vec<StabilitySample> = Vec::with_capacity(attempts);
    for attempt in 0..attempts {
        let sample = match prober.ping(addr).await {
            Ok(rtt) => StabilitySample::success(addr, attempt, rtt),
            Err(e) => {
                debug!("{addr} attempt {attempt}: {e}");
                StabilitySample::failure(addr, attempt)
            }
        };
        samples.push(sample);
    }
    StabilityResult::from_samples(addr, &samples)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
