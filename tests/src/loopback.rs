use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use edgeprobe_common::network::Sampler;
use edgeprobe_core::network::tcp::TcpProber;
use edgeprobe_core::scanner::ScanScheduler;
use edgeprobe_core::stability::StabilityTester;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::util::{ip, locations};

const TRACE_BODY: &str = "HTTP/1.1 200 OK\r\n\
Content-Type: text/plain\r\n\r\n\
fl=1f1\nh=127.0.0.1\nip=127.0.0.1\nts=1700000000.0\nvisit_scheme=http\n\
uag=Mozilla/5.0\ncolo=NRT\nhttp=http/1.1\n";

/// A local stand-in for an edge node: answers every connection with a trace body.
async fn edge_node() -> u16 {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(TRACE_BODY.as_bytes()).await;
            });
        }
    });
    port
}

fn prober(port: u16) -> TcpProber {
    TcpProber::new(port, port, Duration::from_secs(1), Duration::from_secs(1))
}

#[tokio::test]
async fn scan_identifies_a_local_edge_node() {
    let port = edge_node().await;

    let outcome = ScanScheduler::new(
        Arc::new(prober(port)),
        vec!["127.0.0.1/32".parse().unwrap()],
        Arc::new(locations()),
    )
    .concurrency(2)
    .target(1)
    .max_attempts(10)
    .run(&mut Sampler::new(None))
    .await;

    assert_eq!(outcome.results.len(), 1);
    let result = &outcome.results[0];
    assert_eq!(result.addr, ip("127.0.0.1"));
    assert_eq!(result.datacenter.as_deref(), Some("NRT"));
    assert_eq!(result.city, "Tokyo");
    assert!(result.latency < Duration::from_secs(1));
}

#[tokio::test]
async fn stability_test_against_a_local_edge_node() {
    let port = edge_node().await;

    let results = StabilityTester::new(Arc::new(prober(port)))
        .attempts(3)
        .run(vec![ip("127.0.0.1")])
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].successes, 3);
    assert_eq!(results[0].loss_ratio, 0.0);
    assert!(results[0].min <= results[0].avg && results[0].avg <= results[0].max);
}

#[tokio::test]
async fn closed_port_counts_as_loss() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let results = StabilityTester::new(Arc::new(prober(port)))
        .attempts(2)
        .run(vec![ip("127.0.0.1")])
        .await;

    assert_eq!(results[0].successes, 0);
    assert_eq!(results[0].loss_ratio, 1.0);
    assert!(results[0].avg.is_none());
}
