//! # Flat-file export and import
//!
//! Writes the phase tables and the short-list, and reads a phase-1 table
//! back so a run can skip re-scanning. Every file is written to a temporary
//! sibling first and renamed into place, so a failed export never leaves a
//! half-written file behind.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use edgeprobe_common::results::{ScanResult, StabilityResult};
use thiserror::Error;
use tracing::warn;

pub const SCAN_HEADER: &str = "address,datacenter,region,city,latency_ms";
pub const STABILITY_HEADER: &str = "address,min_ms,max_ms,avg_ms,loss_pct";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to move {from} into place at {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

/// Writes the phase-1 table.
pub fn write_scan_csv<W: Write>(results: &[ScanResult], mut writer: W) -> io::Result<()> {
    writeln!(writer, "{SCAN_HEADER}")?;
    for result in results {
        writeln!(
            writer,
            "{},{},{},{},{}",
            result.addr,
            escape_csv(result.datacenter.as_deref().unwrap_or_default()),
            escape_csv(&result.region),
            escape_csv(&result.city),
            result.latency.as_millis()
        )?;
    }
    writer.flush()
}

/// Writes the phase-2 table. Absent latencies become empty fields.
pub fn write_stability_csv<W: Write>(results: &[StabilityResult], mut writer: W) -> io::Result<()> {
    writeln!(writer, "{STABILITY_HEADER}")?;
    for result in results {
        writeln!(
            writer,
            "{},{},{},{},{:.1}",
            result.addr,
            millis_or_empty(result.min),
            millis_or_empty(result.max),
            millis_or_empty(result.avg),
            result.loss_percent()
        )?;
    }
    writer.flush()
}

/// Writes one address per line.
pub fn write_addresses<'a, W, I>(addrs: I, mut writer: W) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a IpAddr>,
{
    for addr in addrs {
        writeln!(writer, "{addr}")?;
    }
    writer.flush()
}

/// Runs `write` against a temporary file next to `path`, then renames it
/// over `path`. On failure the temporary file is removed.
pub fn persist<F>(path: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let tmp = temp_path(path);
    let written = File::create(&tmp).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    });

    if let Err(source) = written {
        let _ = fs::remove_file(&tmp);
        return Err(ExportError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        ExportError::Rename {
            from: tmp.clone(),
            to: path.to_path_buf(),
            source,
        }
    })
}

pub fn export_scan(path: &Path, results: &[ScanResult]) -> Result<(), ExportError> {
    persist(path, |w| write_scan_csv(results, w))
}

pub fn export_stability(path: &Path, results: &[StabilityResult]) -> Result<(), ExportError> {
    persist(path, |w| write_stability_csv(results, w))
}

pub fn export_addresses<'a, I>(path: &Path, addrs: I) -> Result<(), ExportError>
where
    I: IntoIterator<Item = &'a IpAddr>,
{
    persist(path, |w| write_addresses(addrs, w))
}

/// Reads a phase-1 table. Malformed rows are skipped with a warning.
pub fn import_scan(path: &Path) -> Result<Vec<ScanResult>, ImportError> {
    let content = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_scan_csv(&content))
}

pub fn parse_scan_csv(content: &str) -> Vec<ScanResult> {
    content
        .lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| {
            let row = parse_scan_row(line);
            if row.is_none() {
                warn!("Skipping malformed row {}: {line}", idx + 1);
            }
            row
        })
        .collect()
}

fn parse_scan_row(line: &str) -> Option<ScanResult> {
    let fields = split_csv_line(line);
    let [addr, datacenter, region, city, latency, ..] = fields.as_slice() else {
        return None;
    };

    let addr: IpAddr = addr.trim().parse().ok()?;
    let latency_ms: u64 = latency
        .trim()
        .trim_end_matches("ms")
        .trim()
        .parse()
        .ok()?;

    let mut result = ScanResult::new(addr, Duration::from_millis(latency_ms))
        .with_location(region.as_str(), city.as_str());
    if !datacenter.is_empty() {
        result = result.with_datacenter(datacenter.as_str());
    }
    Some(result)
}

/// Escapes a field: quoted if it contains a comma, quote or newline.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Splits one CSV line, honouring quoted fields and doubled quotes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => quoted = false,
            ('"', false) if field.is_empty() => quoted = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            (c, _) => field.push(c),
        }
    }
    fields.push(field);
    fields
}

fn millis_or_empty(value: Option<Duration>) -> String {
    value
        .map(|d| d.as_millis().to_string())
        .unwrap_or_default()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
