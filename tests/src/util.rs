use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use edgeprobe_common::error::ProbeError;
use edgeprobe_common::location::{Location, LocationTable};
use edgeprobe_core::{ProbeReply, Prober};

/// Answers from a fixed table. Unknown addresses are refused.
#[derive(Default)]
pub struct ScriptedProber {
    scan: HashMap<IpAddr, (Duration, Option<String>)>,
    ping: Mutex<HashMap<IpAddr, Vec<Option<Duration>>>>,
}

impl ScriptedProber {
    pub fn answers(mut self, addr: &str, latency_ms: u64, datacenter: Option<&str>) -> Self {
        self.scan.insert(
            addr.parse().unwrap(),
            (Duration::from_millis(latency_ms), datacenter.map(str::to_string)),
        );
        self
    }

    /// Scripted ping round trips in milliseconds, `None` for a failed attempt.
    /// Replayed in order; attempts past the end fail.
    pub fn pings(self, addr: &str, rtts: &[Option<u64>]) -> Self {
        let rtts = rtts
            .iter()
            .map(|r| r.map(Duration::from_millis))
            .rev()
            .collect();
        self.ping
            .lock()
            .unwrap()
            .insert(addr.parse().unwrap(), rtts);
        self
    }
}

fn refused() -> ProbeError {
    ProbeError::Connect(io::Error::from(io::ErrorKind::ConnectionRefused))
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn scan(&self, addr: IpAddr) -> Result<ProbeReply, ProbeError> {
        tokio::task::yield_now().await;
        match self.scan.get(&addr) {
            Some((latency, datacenter)) => Ok(ProbeReply {
                latency: *latency,
                datacenter: datacenter.clone(),
            }),
            None => Err(refused()),
        }
    }

    async fn ping(&self, addr: IpAddr) -> Result<Duration, ProbeError> {
        tokio::task::yield_now().await;
        let next = self
            .ping
            .lock()
            .unwrap()
            .get_mut(&addr)
            .and_then(|script| script.pop())
            .flatten();
        next.ok_or_else(refused)
    }
}

pub fn locations() -> LocationTable {
    LocationTable::new([
        Location {
            iata: "FRA".into(),
            region: "Europe".into(),
            city: "Frankfurt".into(),
            ..location()
        },
        Location {
            iata: "NRT".into(),
            region: "Asia Pacific".into(),
            city: "Tokyo".into(),
            ..location()
        },
    ])
}

fn location() -> Location {
    Location {
        iata: String::new(),
        lat: 0.0,
        lon: 0.0,
        cca2: String::new(),
        region: String::new(),
        city: String::new(),
    }
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}
