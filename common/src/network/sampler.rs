//! # Random Sampler
//!
//! Draws host addresses from [`AddressRange`]s using a per-run random source.
//! There is no process-wide generator: whoever owns the [`Sampler`] owns the
//! randomness, and seeding it makes a run reproducible.

use std::net::IpAddr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::range::AddressRange;

pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Creates a sampler seeded from the OS, or from `seed` when given.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Draws one host address from `range`.
    ///
    /// For blocks with at least two host bits the offset is uniform over
    /// `[1, 2^hostBits - 2]`, so the network and broadcast addresses are never
    /// returned. Smaller blocks and the full address space are sampled over
    /// their whole span.
    pub fn sample(&mut self, range: &AddressRange) -> IpAddr {
        let host_bits = range.host_bits();
        let max_offset = range.max_offset();

        let offset = if host_bits <= 1 || host_bits == range.family().width() {
            match host_bits {
                128 => self.rng.random::<u128>(),
                _ => self.rng.random_range(0..=max_offset),
            }
        } else {
            self.rng.random_range(1..=max_offset - 1)
        };

        range.at(offset)
    }

    /// Picks one range uniformly, then samples it. `None` when `ranges` is empty.
    pub fn sample_from(&mut self, ranges: &[AddressRange]) -> Option<IpAddr> {
        if ranges.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..ranges.len());
        Some(self.sample(&ranges[idx]))
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
