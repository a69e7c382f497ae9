//! Records produced by the two probing phases.

use std::net::IpAddr;
use std::time::Duration;

/// One successful phase-1 probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub addr: IpAddr,
    /// Datacenter code reported by the endpoint, if it sent one.
    pub datacenter: Option<String>,
    /// Empty when the code is absent or unknown to the location table.
    pub region: String,
    pub city: String,
    pub latency: Duration,
}

impl ScanResult {
    pub fn new(addr: IpAddr, latency: Duration) -> Self {
        Self {
            addr,
            datacenter: None,
            region: String::new(),
            city: String::new(),
            latency,
        }
    }

    pub fn with_datacenter(mut self, code: impl Into<String>) -> Self {
        self.datacenter = Some(code.into());
        self
    }

    pub fn with_location(mut self, region: impl Into<String>, city: impl Into<String>) -> Self {
        self.region = region.into();
        self.city = city.into();
        self
    }
}

/// A single stability-test attempt: a round-trip time, or `None` for a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilitySample {
    pub addr: IpAddr,
    pub attempt: usize,
    pub rtt: Option<Duration>,
}

impl StabilitySample {
    pub fn success(addr: IpAddr, attempt: usize, rtt: Duration) -> Self {
        Self {
            addr,
            attempt,
            rtt: Some(rtt),
        }
    }

    pub fn failure(addr: IpAddr, attempt: usize) -> Self {
        Self {
            addr,
            attempt,
            rtt: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.rtt.is_some()
    }
}

/// Aggregated stability statistics for one address.
///
/// `min`, `max` and `avg` are `None` when every attempt failed; that is not
/// the same thing as a zero latency.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityResult {
    pub addr: IpAddr,
    pub attempts: usize,
    pub successes: usize,
    pub min: Option<Duration>,
    pub max: Option<Duration>,
    pub avg: Option<Duration>,
    /// `failed / attempts`, in `[0.0, 1.0]`.
    pub loss_ratio: f64,
}

impl StabilityResult {
    /// Folds the samples for `addr` into a result. Samples for other
    /// addresses are ignored.
    pub fn from_samples(addr: IpAddr, samples: &[StabilitySample]) -> Self {
        let mut attempts = 0usize;
        let mut rtts: Vec<Duration> = Vec::with_capacity(samples.len());

        for sample in samples.iter().filter(|s| s.addr == addr) {
            attempts += 1;
            if let Some(rtt) = sample.rtt {
                rtts.push(rtt);
            }
        }

        let successes = rtts.len();
        let avg = match successes {
            0 => None,
            n => Some(rtts.iter().sum::<Duration>() / n as u32),
        };
        let loss_ratio = match attempts {
            0 => 1.0,
            n => (n - successes) as f64 / n as f64,
        };

        Self {
            addr,
            attempts,
            successes,
            min: rtts.iter().min().copied(),
            max: rtts.iter().max().copied(),
            avg,
            loss_ratio,
        }
    }

    pub fn loss_percent(&self) -> f64 {
        self.loss_ratio * 100.0
    }

    /// At least one attempt completed.
    pub fn is_reachable(&self) -> bool {
        self.successes > 0
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
