//! The transport seam between the schedulers and the network.
//!
//! Schedulers only ever talk to a [`Prober`]; the real implementation is
//! [`crate::network::tcp::TcpProber`], tests substitute in-memory ones.

use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use edgeprobe_common::error::ProbeError;

/// What a successful phase-1 probe learned about an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReply {
    /// Time taken to establish the connection.
    pub latency: Duration,
    /// Datacenter code from the identifying response, if any.
    pub datacenter: Option<String>,
}

#[async_trait]
pub trait Prober: Send + Sync {
    /// Connects, times the handshake and tries to identify the datacenter.
    async fn scan(&self, addr: IpAddr) -> Result<ProbeReply, ProbeError>;

    /// A single timed connection attempt for the stability test.
    async fn ping(&self, addr: IpAddr) -> Result<Duration, ProbeError>;
}

/// Counts probes currently in flight and remembers the high-water mark.
#[derive(Debug, Default)]
pub struct InFlightGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightGauge {
    pub fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    pub fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}
