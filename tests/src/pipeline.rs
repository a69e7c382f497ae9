use std::sync::Arc;
use std::time::Duration;

use edgeprobe_common::network::{AddressRange, Sampler};
use edgeprobe_core::analysis::Candidates;
use edgeprobe_core::export::parse_scan_csv;
use edgeprobe_core::rank;
use edgeprobe_core::scanner::ScanScheduler;
use edgeprobe_core::stability::StabilityTester;

use crate::util::{ScriptedProber, ip, locations};

const THRESHOLD: Duration = Duration::from_millis(300);

fn range(s: &str) -> AddressRange {
    s.parse().unwrap()
}

#[tokio::test]
async fn scan_then_test_a_small_block() {
    let prober = Arc::new(
        ScriptedProber::default()
            .answers("10.0.0.1", 50, Some("FRA"))
            .pings("10.0.0.1", &[Some(10), Some(20), None, Some(30)]),
    );

    let ranges = vec![range("10.0.0.0/30")];
    let outcome = ScanScheduler::new(Arc::clone(&prober), ranges, Arc::new(locations()))
        .concurrency(2)
        .target(1)
        .run(&mut Sampler::new(Some(7)))
        .await;

    let mut scanned = outcome.results;
    rank::rank_scan(&mut scanned);
    assert_eq!(scanned.len(), 1);
    assert_eq!(scanned[0].addr, ip("10.0.0.1"));
    assert_eq!(scanned[0].latency, Duration::from_millis(50));
    assert_eq!(scanned[0].datacenter.as_deref(), Some("FRA"));
    assert_eq!(scanned[0].region, "Europe");
    assert_eq!(scanned[0].city, "Frankfurt");
    assert!(outcome.peak_in_flight <= 2);

    let candidates = Candidates::select(&scanned, THRESHOLD, None);
    assert_eq!(candidates.addrs, vec![ip("10.0.0.1")]);

    let mut tested = StabilityTester::new(prober).attempts(4).run(candidates.addrs).await;
    rank::rank_stability(&mut tested);

    let result = &tested[0];
    assert_eq!(result.min, Some(Duration::from_millis(10)));
    assert_eq!(result.max, Some(Duration::from_millis(30)));
    assert_eq!(result.avg, Some(Duration::from_millis(20)));
    assert!((result.loss_percent() - 25.0).abs() < f64::EPSILON);

    let best = rank::shortlist(&tested, THRESHOLD, None);
    assert_eq!(best.len(), 1);
}

#[tokio::test]
async fn a_saved_scan_table_feeds_the_stability_test() {
    let saved = "\
address,datacenter,region,city,latency_ms
10.1.0.9,NRT,Asia Pacific,Tokyo,120
10.1.0.3,FRA,Europe,Frankfurt,40
10.1.0.7,FRA,Europe,Frankfurt,450
not-an-address,FRA,Europe,Frankfurt,10
";
    let scanned = parse_scan_csv(saved);
    assert_eq!(scanned.len(), 3);

    let prober = Arc::new(
        ScriptedProber::default()
            .pings("10.1.0.9", &[Some(90), Some(110)])
            .pings("10.1.0.3", &[Some(45), Some(35)]),
    );

    let candidates = Candidates::select(&scanned, THRESHOLD, None);
    assert_eq!(candidates.addrs, vec![ip("10.1.0.9"), ip("10.1.0.3")]);

    let mut tested = StabilityTester::new(prober)
        .attempts(2)
        .concurrency(2)
        .run(candidates.addrs)
        .await;
    rank::rank_stability(&mut tested);

    let order: Vec<_> = tested.iter().map(|r| r.addr).collect();
    assert_eq!(order, vec![ip("10.1.0.3"), ip("10.1.0.9")]);
    assert!(tested.iter().all(|r| r.loss_ratio == 0.0));
}

#[tokio::test]
async fn an_address_sampled_twice_is_tested_once() {
    let saved = "\
address,datacenter,region,city,latency_ms
104.16.0.5,FRA,Europe,Frankfurt,30
104.16.0.7,FRA,Europe,Frankfurt,35
104.16.0.5,FRA,Europe,Frankfurt,52
";
    let scanned = parse_scan_csv(saved);
    let prober = Arc::new(
        ScriptedProber::default()
            .pings("104.16.0.5", &[Some(30), Some(32), Some(31)])
            .pings("104.16.0.7", &[Some(36), Some(35), Some(37)]),
    );

    let candidates = Candidates::select(&scanned, THRESHOLD, None);
    assert_eq!(candidates.addrs, vec![ip("104.16.0.5"), ip("104.16.0.7")]);

    let tester = StabilityTester::new(prober).attempts(3).concurrency(4);
    let mut tested = tester.run(candidates.addrs).await;
    rank::rank_stability(&mut tested);

    // One script per address: a second concurrent tester would run it dry.
    assert_eq!(tested.len(), 2);
    assert!(tested.iter().all(|r| r.successes == 3));
    let best: Vec<_> = rank::shortlist(&tested, THRESHOLD, None)
        .iter()
        .map(|r| r.addr)
        .collect();
    assert_eq!(best, vec![ip("104.16.0.5"), ip("104.16.0.7")]);
}

#[tokio::test]
async fn datacenter_filter_narrows_the_candidates() {
    let saved = "\
address,datacenter,region,city,latency_ms
10.1.0.9,NRT,Asia Pacific,Tokyo,120
10.1.0.3,FRA,Europe,Frankfurt,40
";
    let scanned = parse_scan_csv(saved);
    let candidates = Candidates::select(&scanned, THRESHOLD, Some("fra"));
    assert_eq!(candidates.addrs, vec![ip("10.1.0.3")]);
    assert!(candidates.shortfall(10).is_some());
}

#[tokio::test]
async fn unreachable_addresses_rank_last_with_no_latencies() {
    let prober = Arc::new(
        ScriptedProber::default()
            .pings("10.2.0.2", &[Some(80), Some(80)])
            .pings("10.2.0.1", &[None, None]),
    );

    let mut tested = StabilityTester::new(prober)
        .attempts(2)
        .run(vec![ip("10.2.0.1"), ip("10.2.0.2")])
        .await;
    rank::rank_stability(&mut tested);

    assert_eq!(tested[0].addr, ip("10.2.0.2"));
    let lost = &tested[1];
    assert_eq!(lost.addr, ip("10.2.0.1"));
    assert_eq!((lost.min, lost.max, lost.avg), (None, None, None));
    assert_eq!(lost.loss_ratio, 1.0);
    assert_eq!(rank::shortlist(&tested, THRESHOLD, None).len(), 1);
}

#[tokio::test]
async fn no_candidates_means_no_work() {
    let prober = Arc::new(ScriptedProber::default());
    let tested = StabilityTester::new(prober).run(Vec::new()).await;
    assert!(tested.is_empty());
    assert!(rank::shortlist(&tested, THRESHOLD, Some(5)).is_empty());
}

#[tokio::test]
async fn scan_gives_up_at_the_attempt_cap() {
    let prober = Arc::new(ScriptedProber::default());
    let outcome = ScanScheduler::new(prober, vec![range("10.3.0.0/24")], Arc::new(locations()))
        .concurrency(4)
        .target(5)
        .max_attempts(40)
        .run(&mut Sampler::new(Some(1)))
        .await;

    assert!(outcome.results.is_empty());
    assert_eq!(outcome.attempts, 40);
}
