use std::time::Duration;

/// Which address families the scan phase draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FamilySelection {
    #[default]
    V4,
    V6,
    Both,
}

impl FamilySelection {
    pub fn wants_v4(self) -> bool {
        matches!(self, Self::V4 | Self::Both)
    }

    pub fn wants_v6(self) -> bool {
        matches!(self, Self::V6 | Self::Both)
    }
}

/// Run configuration. Built once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of phase-1 probes in flight.
    pub scan_concurrency: usize,
    /// Maximum number of addresses under stability test at once.
    pub test_concurrency: usize,
    /// Port used for the stability test.
    pub port: u16,
    /// Port used for the phase-1 connect and identifying request.
    pub trace_port: u16,
    /// Phase-1 results at or above this latency are not re-tested.
    pub threshold: Duration,
    /// Upper bound on every connection attempt.
    pub connect_timeout: Duration,
    /// Upper bound on reading the identifying response.
    pub read_timeout: Duration,
    /// Number of successful phase-1 probes to collect.
    pub sample_target: usize,
    /// Hard cap on phase-1 attempts, successful or not.
    pub max_attempts: usize,
    /// Sequential attempts per address in the stability test.
    pub test_attempts: usize,
    /// Below this many candidates the stability test is flagged as thin.
    pub min_candidates: usize,
    pub families: FamilySelection,
    /// Restricts phase 2 to a single datacenter code.
    pub datacenter: Option<String>,
    /// Truncates the short-list.
    pub top: Option<usize>,
    /// Seeds the sampler for reproducible runs.
    pub seed: Option<u64>,
}

impl Config {
    pub const DEFAULT_SAMPLE_TARGET: usize = 256;
    pub const ATTEMPTS_PER_TARGET: usize = 16;
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_concurrency: 100,
            test_concurrency: 50,
            port: 443,
            trace_port: 80,
            threshold: Duration::from_millis(300),
            connect_timeout: Duration::from_millis(500),
            read_timeout: Duration::from_millis(1500),
            sample_target: Self::DEFAULT_SAMPLE_TARGET,
            max_attempts: Self::DEFAULT_SAMPLE_TARGET * Self::ATTEMPTS_PER_TARGET,
            test_attempts: 10,
            min_candidates: 10,
            families: FamilySelection::V4,
            datacenter: None,
            top: None,
            seed: None,
        }
    }
}
