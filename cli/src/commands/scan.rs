use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use colored::*;
use edgeprobe_common::config::Config;
use edgeprobe_common::location::LocationTable;
use edgeprobe_common::network::{AddressRange, Family, Sampler};
use edgeprobe_common::results::ScanResult;
use edgeprobe_common::success;
use edgeprobe_core::analysis::summarize_datacenters;
use edgeprobe_core::network::tcp::TcpProber;
use edgeprobe_core::scanner::ScanScheduler;
use edgeprobe_core::remote::{self, Downloader};
use edgeprobe_core::{export, rank, sources};
use tracing::{Instrument, info, warn};

use crate::commands::Options;
use crate::terminal::{colors, print, progress, tables};

const TABLE_ROWS: usize = 20;

/// Phase 1: sample the configured ranges, write the scan table and return
/// the ranked results.
pub async fn scan(opts: &Options, cfg: &Config) -> anyhow::Result<Vec<ScanResult>> {
    if !opts.offline {
        fetch_missing_inputs(opts, cfg).await?;
    }

    let ranges = load_ranges(opts, cfg)?;
    let locations = Arc::new(LocationTable::load(&opts.locations)?);
    info!(
        "Loaded {} ranges and {} datacenter locations",
        ranges.len(),
        locations.len()
    );

    let span = progress::phase_span("Scanning", cfg.sample_target);
    let prober = Arc::new(TcpProber::from_config(cfg));
    let scheduler = ScanScheduler::from_config(prober, ranges, locations, cfg)
        .on_progress(progress::reporter(&span));
    let mut sampler = Sampler::new(cfg.seed);

    let start_time = Instant::now();
    let outcome = scheduler.run(&mut sampler).instrument(span).await;
    let mut results = outcome.results;

    if results.len() < cfg.sample_target {
        warn!(
            "Collected {} of {} responsive addresses after {} attempts",
            results.len(),
            cfg.sample_target,
            outcome.attempts
        );
    }

    rank::rank_scan(&mut results);
    let paths = opts.paths(cfg);
    export::export_scan(&paths.scan_table, &results)
        .with_context(|| "could not save the scan results")?;

    scan_ends(&results, outcome.attempts, start_time.elapsed(), cfg, opts.quiet);
    info!("Scan table written to {}", paths.scan_table.display());
    Ok(results)
}

/// Downloads whichever input files are absent. Existing files are used as-is.
async fn fetch_missing_inputs(opts: &Options, cfg: &Config) -> anyhow::Result<()> {
    let downloader = Downloader::new(remote::FETCH_TIMEOUT)?;
    let has_ranges = |body: &str| !sources::parse_ranges(body).is_empty();

    if cfg.families.wants_v4() {
        downloader
            .cache(&opts.v4_file, &opts.v4_url, has_ranges)
            .await
            .with_context(|| format!("could not obtain {}", opts.v4_file.display()))?;
    }
    if cfg.families.wants_v6() {
        downloader
            .cache(&opts.v6_file, &opts.v6_url, has_ranges)
            .await
            .with_context(|| format!("could not obtain {}", opts.v6_file.display()))?;
    }

    let has_locations = |body: &str| {
        LocationTable::from_json(body)
            .map(|table| !table.is_empty())
            .unwrap_or(false)
    };
    downloader
        .cache(&opts.locations, &opts.locations_url, has_locations)
        .await
        .with_context(|| format!("could not obtain {}", opts.locations.display()))?;
    Ok(())
}

fn load_ranges(opts: &Options, cfg: &Config) -> anyhow::Result<Vec<AddressRange>> {
    let mut ranges = Vec::new();
    if cfg.families.wants_v4() {
        ranges.extend(ranges_of(&opts.v4_file, Family::V4)?);
    }
    if cfg.families.wants_v6() {
        ranges.extend(ranges_of(&opts.v6_file, Family::V6)?);
    }
    Ok(ranges)
}

fn ranges_of(path: &Path, family: Family) -> anyhow::Result<Vec<AddressRange>> {
    let (wanted, other): (Vec<AddressRange>, Vec<AddressRange>) = sources::load_ranges(path)?
        .into_iter()
        .partition(|range| range.family() == family);
    if !other.is_empty() {
        warn!(
            "Ignoring {} ranges of the wrong family in {}",
            other.len(),
            path.display()
        );
    }
    if wanted.is_empty() {
        anyhow::bail!("{} contains no {:?} ranges", path.display(), family);
    }
    Ok(wanted)
}

fn scan_ends(
    results: &[ScanResult],
    attempts: usize,
    total_time: std::time::Duration,
    cfg: &Config,
    quiet: bool,
) {
    if results.is_empty() {
        print::header("No responsive addresses", quiet);
        print::no_results();
        return;
    }

    if !quiet {
        print::header("Fastest addresses", quiet);
        tables::scan_table(results, cfg.threshold, TABLE_ROWS);
        print::header("Datacenters", quiet);
        tables::datacenters(&summarize_datacenters(results));
    }

    let found: ColoredString = format!("{} responsive addresses", results.len())
        .bold()
        .green();
    let tried: ColoredString = format!("{attempts} probes").bold().yellow();
    let took: ColoredString = progress::elapsed(total_time).bold().yellow();
    let output = format!("Scan Complete: {found} from {tried} in {took}")
        .color(colors::TEXT_DEFAULT);

    if quiet {
        crate::tprint!();
        success!("{}", output);
    } else {
        print::fat_separator();
        print::centerln(&output.to_string());
    }
}
