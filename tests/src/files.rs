use std::fs;
use std::time::Duration;

use edgeprobe_common::location::LocationTable;
use edgeprobe_common::results::{ScanResult, StabilityResult, StabilitySample};
use edgeprobe_core::{export, rank, sources};

use crate::util::ip;

#[test]
fn scan_table_survives_a_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ip.csv");

    let mut results = vec![
        ScanResult::new(ip("104.16.0.9"), Duration::from_millis(88))
            .with_datacenter("SJC")
            .with_location("North America", "San Jose"),
        ScanResult::new(ip("2606:4700::1"), Duration::from_millis(31))
            .with_datacenter("FRA")
            .with_location("Europe", "Frankfurt, Hesse"),
        ScanResult::new(ip("104.16.0.2"), Duration::from_millis(88)),
    ];
    rank::rank_scan(&mut results);
    export::export_scan(&path, &results).unwrap();

    let loaded = export::import_scan(&path).unwrap();
    assert_eq!(loaded, results);
    assert_eq!(loaded[1].addr, ip("104.16.0.2"));
}

#[test]
fn rank_order_survives_whole_millisecond_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ip.csv");

    let mut results = vec![
        ScanResult::new(ip("9.9.9.9"), Duration::from_micros(40_100)),
        ScanResult::new(ip("1.1.1.1"), Duration::from_micros(40_900)),
        ScanResult::new(ip("8.8.8.8"), Duration::from_micros(39_990)),
    ];
    rank::rank_scan(&mut results);
    export::export_scan(&path, &results).unwrap();

    let mut loaded = export::import_scan(&path).unwrap();
    let written: Vec<_> = loaded.iter().map(|r| r.addr).collect();
    rank::rank_scan(&mut loaded);
    let reranked: Vec<_> = loaded.iter().map(|r| r.addr).collect();

    assert_eq!(written, vec![ip("8.8.8.8"), ip("1.1.1.1"), ip("9.9.9.9")]);
    assert_eq!(reranked, written);
}

#[test]
fn stability_table_and_shortlist_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("result.csv");
    let best = dir.path().join("best-ips.txt");

    let fast = ip("104.16.0.1");
    let lossy = ip("104.16.0.2");
    let dead = ip("104.16.0.3");
    let mut results = vec![
        StabilityResult::from_samples(dead, &[StabilitySample::failure(dead, 0)]),
        StabilityResult::from_samples(
            lossy,
            &[
                StabilitySample::success(lossy, 0, Duration::from_millis(40)),
                StabilitySample::failure(lossy, 1),
            ],
        ),
        StabilityResult::from_samples(
            fast,
            &[
                StabilitySample::success(fast, 0, Duration::from_millis(20)),
                StabilitySample::success(fast, 1, Duration::from_millis(30)),
            ],
        ),
    ];
    rank::rank_stability(&mut results);
    export::export_stability(&table, &results).unwrap();

    let shortlisted = rank::shortlist(&results, Duration::from_millis(300), Some(1));
    export::export_addresses(&best, shortlisted.iter().copied().map(|r| &r.addr))
        .unwrap();

    let written = fs::read_to_string(&table).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], export::STABILITY_HEADER);
    assert!(lines[1].starts_with("104.16.0.1,20,30,25,0.0"));
    assert!(lines[2].starts_with("104.16.0.2,40,40,40,50.0"));
    assert_eq!(lines[3], "104.16.0.3,,,,100.0");

    assert_eq!(fs::read_to_string(&best).unwrap(), "104.16.0.1\n");
    assert!(fs::read_dir(dir.path()).unwrap().all(|e| {
        !e.unwrap().file_name().to_string_lossy().ends_with(".tmp")
    }));
}

#[test]
fn export_to_a_missing_directory_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("ip.csv");
    assert!(export::export_scan(&path, &[]).is_err());
    assert!(!path.exists());
}

#[test]
fn input_files_are_loaded_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let ranges = dir.path().join("ips-v4.txt");
    let locations = dir.path().join("locations.json");

    fs::write(&ranges, "# edge ranges\n173.245.48.0/20\n\nbogus\n103.21.244.0/22\n").unwrap();
    fs::write(
        &locations,
        r#"[{"iata":"AMS","lat":52.3,"lon":4.7,"cca2":"NL","region":"Europe","city":"Amsterdam"}]"#,
    )
    .unwrap();

    let loaded = sources::load_ranges(&ranges).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].prefix(), 20);

    let table = LocationTable::load(&locations).unwrap();
    assert_eq!(table.resolve("AMS").map(|l| l.city.as_str()), Some("Amsterdam"));
    assert!(table.resolve("XXX").is_none());
}
