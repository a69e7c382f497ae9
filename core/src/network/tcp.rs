use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use edgeprobe_common::config::Config;
use edgeprobe_common::error::ProbeError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::trace;
use crate::probe::{ProbeReply, Prober};

const READ_CHUNK: usize = 4096;
const MAX_RESPONSE: usize = 16 * 1024;

/// Connection-timing prober over plain TCP.
#[derive(Debug, Clone)]
pub struct TcpProber {
    trace_port: u16,
    test_port: u16,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl TcpProber {
    pub fn new(
        trace_port: u16,
        test_port: u16,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        Self {
            trace_port,
            test_port,
            connect_timeout,
            read_timeout,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.trace_port, cfg.port, cfg.connect_timeout, cfg.read_timeout)
    }

    async fn connect(&self, socket_addr: SocketAddr) -> Result<(TcpStream, Duration), ProbeError> {
        let start = Instant::now();
        match timeout(self.connect_timeout, TcpStream::connect(socket_addr)).await {
            Ok(Ok(stream)) => Ok((stream, start.elapsed())),
            Ok(Err(e)) => Err(ProbeError::Connect(e)),
            Err(_elapsed) => Err(ProbeError::Timeout),
        }
    }

    /// Sends the trace request and reads until a datacenter code shows up,
    /// the peer closes, or the size cap is hit.
    async fn identify(&self, stream: &mut TcpStream, addr: IpAddr) -> Option<String> {
        let exchange = async {
            stream.write_all(trace::request(addr).as_bytes()).await?;

            let mut response: Vec<u8> = Vec::with_capacity(READ_CHUNK);
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                let n = stream.read(&mut chunk).await?;
                if n == 0 {
                    return Ok::<_, std::io::Error>((response, true));
                }
                response.extend_from_slice(&chunk[..n]);
                if response.len() >= MAX_RESPONSE
                    || trace::has_datacenter(&String::from_utf8_lossy(&response))
                {
                    return Ok::<_, std::io::Error>((response, false));
                }
            }
        };

        match timeout(self.read_timeout, exchange).await {
            Ok(Ok((bytes, closed))) => {
                let response = String::from_utf8_lossy(&bytes);
                if closed {
                    trace::parse_datacenter(&response)
                } else {
                    trace::parse_complete_lines(&response)
                }
            }
            Ok(Err(e)) => {
                debug!("{addr}: identifying exchange failed: {e}");
                None
            }
            Err(_elapsed) => {
                debug!("{addr}: identifying response timed out");
                None
            }
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn scan(&self, addr: IpAddr) -> Result<ProbeReply, ProbeError> {
        let (mut stream, latency) = self.connect(SocketAddr::new(addr, self.trace_port)).await?;
        let datacenter = self.identify(&mut stream, addr).await;
        Ok(ProbeReply {
            latency,
            datacenter,
        })
    }

    async fn ping(&self, addr: IpAddr) -> Result<Duration, ProbeError> {
        let (_stream, latency) = self.connect(SocketAddr::new(addr, self.test_port)).await?;
        Ok(latency)
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
