pub mod run;
pub mod scan;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use edgeprobe_common::config::{Config, FamilySelection};
use edgeprobe_core::remote;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "edgeprobe")]
#[command(about = "Find the fastest and steadiest endpoints in a CDN's published address ranges.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub opts: Options,
}

#[derive(Subcommand, Clone, Copy)]
pub enum Commands {
    /// Scan (or reuse the last scan), then stability-test the fast results
    #[command(alias = "r")]
    Run,
    /// Sample and probe the address ranges, writing the phase-1 table
    #[command(alias = "s")]
    Scan,
    /// Stability-test the results of an earlier scan
    #[command(alias = "t")]
    Test,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FamilyArg {
    V4,
    V6,
    Both,
}

impl From<FamilyArg> for FamilySelection {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::V4 => FamilySelection::V4,
            FamilyArg::V6 => FamilySelection::V6,
            FamilyArg::Both => FamilySelection::Both,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct Options {
    /// Maximum concurrent probes while scanning
    #[arg(long = "scan", default_value_t = 100, global = true)]
    pub scan_concurrency: usize,

    /// Maximum addresses under stability test at once
    #[arg(long = "test", default_value_t = 50, global = true)]
    pub test_concurrency: usize,

    /// Port used by the stability test
    #[arg(long, default_value_t = 443, global = true)]
    pub port: u16,

    /// Latency threshold in milliseconds
    #[arg(long = "delay", default_value_t = 300, global = true)]
    pub delay_ms: u64,

    /// Port used for the scan and its trace request
    #[arg(long, default_value_t = 80, global = true)]
    pub trace_port: u16,

    /// Connection timeout in milliseconds
    #[arg(long = "timeout", default_value_t = 500, global = true)]
    pub timeout_ms: u64,

    /// Timeout in milliseconds for reading the trace response
    #[arg(long = "read-timeout", default_value_t = 1500, global = true)]
    pub read_timeout_ms: u64,

    /// Number of responsive addresses to collect while scanning
    #[arg(long, default_value_t = Config::DEFAULT_SAMPLE_TARGET, global = true)]
    pub count: usize,

    /// Give up scanning after this many probes [default: count * 16]
    #[arg(long, global = true)]
    pub max_attempts: Option<usize>,

    /// Connection attempts per address in the stability test
    #[arg(long, default_value_t = 10, global = true)]
    pub attempts: usize,

    /// Warn when fewer candidates than this reach the stability test
    #[arg(long, default_value_t = 10, global = true)]
    pub min_candidates: usize,

    /// Address families to scan
    #[arg(long, value_enum, default_value_t = FamilyArg::V4, global = true)]
    pub family: FamilyArg,

    /// IPv4 range list, one CIDR per line
    #[arg(long, default_value = "ips-v4.txt", global = true)]
    pub v4_file: PathBuf,

    /// IPv6 range list, one CIDR per line
    #[arg(long, default_value = "ips-v6.txt", global = true)]
    pub v6_file: PathBuf,

    /// Datacenter location dataset (JSON)
    #[arg(long, default_value = "locations.json", global = true)]
    pub locations: PathBuf,

    /// Where a missing IPv4 range list is downloaded from
    #[arg(long, default_value = remote::DEFAULT_V4_URL, global = true)]
    pub v4_url: String,

    /// Where a missing IPv6 range list is downloaded from
    #[arg(long, default_value = remote::DEFAULT_V6_URL, global = true)]
    pub v6_url: String,

    /// Where a missing location dataset is downloaded from
    #[arg(long, default_value = remote::DEFAULT_LOCATIONS_URL, global = true)]
    pub locations_url: String,

    /// Never download missing input files
    #[arg(long, global = true)]
    pub offline: bool,

    /// Directory the result files are written to
    #[arg(long, short = 'o', default_value = ".", global = true)]
    pub output_dir: PathBuf,

    /// Only stability-test addresses served by this datacenter
    #[arg(long, global = true)]
    pub colo: Option<String>,

    /// Keep at most this many addresses in the short-list
    #[arg(long, global = true)]
    pub top: Option<usize>,

    /// Seed for the address sampler
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Scan again even if a previous scan table exists
    #[arg(long, global = true)]
    pub refresh: bool,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Where a run reads and writes its files.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub scan_table: PathBuf,
    pub candidates: PathBuf,
    pub stability_table: PathBuf,
    pub shortlist: PathBuf,
}

impl Options {
    pub fn to_config(&self) -> Config {
        let sample_target = self.count.max(1);
        Config {
            scan_concurrency: self.scan_concurrency.max(1),
            test_concurrency: self.test_concurrency.max(1),
            port: self.port,
            trace_port: self.trace_port,
            threshold: Duration::from_millis(self.delay_ms),
            connect_timeout: Duration::from_millis(self.timeout_ms.max(1)),
            read_timeout: Duration::from_millis(self.read_timeout_ms.max(1)),
            sample_target,
            max_attempts: self
                .max_attempts
                .unwrap_or(sample_target.saturating_mul(Config::ATTEMPTS_PER_TARGET))
                .max(1),
            test_attempts: self.attempts.max(1),
            min_candidates: self.min_candidates,
            families: self.family.into(),
            datacenter: self
                .colo
                .as_ref()
                .map(|code| code.trim().to_ascii_uppercase()),
            top: self.top,
            seed: self.seed,
        }
    }

    pub fn paths(&self, cfg: &Config) -> OutputPaths {
        let stability_name = match &cfg.datacenter {
            Some(code) => format!("{code}.csv"),
            None => "result.csv".to_string(),
        };
        OutputPaths {
            scan_table: self.output_dir.join("ip.csv"),
            candidates: self.output_dir.join("ip.txt"),
            stability_table: self.output_dir.join(stability_name),
            shortlist: self.output_dir.join("best-ips.txt"),
        }
    }

    pub fn level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::WARN,
            (false, 0) => LevelFilter::INFO,
            (false, 1) => LevelFilter::DEBUG,
            (false, _) => LevelFilter::TRACE,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let cli = CommandLine::try_parse_from(["edgeprobe"]).unwrap();
        assert!(cli.command.is_none());

        let cfg = cli.opts.to_config();
        assert_eq!(cfg.scan_concurrency, 100);
        assert_eq!(cfg.test_concurrency, 50);
        assert_eq!(cfg.port, 443);
        assert_eq!(cfg.threshold, Duration::from_millis(300));
        assert_eq!(cfg.max_attempts, Config::DEFAULT_SAMPLE_TARGET * Config::ATTEMPTS_PER_TARGET);
        assert_eq!(cfg.families, FamilySelection::V4);
    }

    #[test]
    fn download_sources_default_to_the_public_lists() {
        let cli = CommandLine::try_parse_from(["edgeprobe"]).unwrap();
        assert_eq!(cli.opts.v4_url, remote::DEFAULT_V4_URL);
        assert_eq!(cli.opts.v6_url, remote::DEFAULT_V6_URL);
        assert_eq!(cli.opts.locations_url, remote::DEFAULT_LOCATIONS_URL);
        assert!(!cli.opts.offline);

        let cli = CommandLine::try_parse_from([
            "edgeprobe", "scan", "--offline", "--v4-url", "http://mirror.test/v4",
        ])
        .unwrap();
        assert!(cli.opts.offline);
        assert_eq!(cli.opts.v4_url, "http://mirror.test/v4");
    }

    #[test]
    fn flags_after_the_subcommand_are_accepted() {
        let cli = CommandLine::try_parse_from([
            "edgeprobe", "test", "--test", "8", "--port", "8443", "--delay", "150", "--colo", "fra",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Test)));

        let cfg = cli.opts.to_config();
        assert_eq!(cfg.test_concurrency, 8);
        assert_eq!(cfg.port, 8443);
        assert_eq!(cfg.threshold, Duration::from_millis(150));
        assert_eq!(cfg.datacenter.as_deref(), Some("FRA"));
        assert!(cli.opts.paths(&cfg).stability_table.ends_with("FRA.csv"));
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let cli = CommandLine::try_parse_from(["edgeprobe", "--scan", "0", "--test", "0"]).unwrap();
        let cfg = cli.opts.to_config();
        assert_eq!(cfg.scan_concurrency, 1);
        assert_eq!(cfg.test_concurrency, 1);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert!(CommandLine::try_parse_from(["edgeprobe", "--port", "https"]).is_err());
        assert!(CommandLine::try_parse_from(["edgeprobe", "--family", "v5"]).is_err());
    }
}
