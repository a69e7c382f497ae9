use std::net::IpAddr;
use std::time::Duration;

use colored::*;
use edgeprobe_common::results::{ScanResult, StabilityResult};
use edgeprobe_core::analysis::{DatacenterSummary, LossBucket};

use crate::terminal::colors;
use crate::terminal::print::{TOTAL_WIDTH, print};

const ADDR_WIDTH: usize = 39;
const BAR_WIDTH: usize = 30;

fn pad(value: ColoredString, width: usize) -> String {
    let visible = console::measure_text_width(&value.to_string());
    format!("{}{}", value, " ".repeat(width.saturating_sub(visible)))
}

fn addr_colored(addr: IpAddr) -> ColoredString {
    match addr {
        IpAddr::V4(_) => addr.to_string().color(colors::IPV4_ADDR),
        IpAddr::V6(_) => addr.to_string().color(colors::IPV6_ADDR),
    }
}

fn ms(duration: Duration) -> String {
    format!("{:.0}ms", duration.as_secs_f64() * 1000.0)
}

fn latency_colored(latency: Option<Duration>, threshold: Duration) -> ColoredString {
    match latency {
        Some(l) if l < threshold => ms(l).color(colors::FAST),
        Some(l) => ms(l).color(colors::SLOW),
        None => "-".color(colors::LOST),
    }
}

fn column_header(columns: &[(&str, usize)]) {
    let line: String = columns
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = *width))
        .collect::<Vec<_>>()
        .join(" ");
    print(&format!("{}", line.color(colors::ACCENT).bold()));
    print(&format!("{}", "─".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)));
}

/// The first `limit` rows of a ranked phase-1 table.
pub fn scan_table(results: &[ScanResult], threshold: Duration, limit: usize) {
    column_header(&[("ADDRESS", ADDR_WIDTH), ("DC", 5), ("CITY", 14), ("LATENCY", 8)]);
    for result in results.iter().take(limit) {
        print(&format!(
            "{} {} {} {}",
            pad(addr_colored(result.addr), ADDR_WIDTH),
            pad(
                result
                    .datacenter
                    .as_deref()
                    .unwrap_or("-")
                    .color(colors::PRIMARY),
                5,
            ),
            pad(result.city.as_str().color(colors::TEXT_DEFAULT), 14),
            latency_colored(Some(result.latency), threshold),
        ));
    }
    omitted(results.len(), limit);
}

/// The first `limit` rows of a ranked phase-2 table.
pub fn stability_table(results: &[StabilityResult], threshold: Duration, limit: usize) {
    column_header(&[("ADDRESS", ADDR_WIDTH), ("MIN", 6), ("MAX", 6), ("AVG", 6), ("LOSS", 6)]);
    for result in results.iter().take(limit) {
        let loss = format!("{:.1}%", result.loss_percent());
        let loss = match result.loss_ratio {
            r if r == 0.0 => loss.color(colors::FAST),
            r if r < 1.0 => loss.color(colors::SLOW),
            _ => loss.color(colors::LOST),
        };
        print(&format!(
            "{} {} {} {} {}",
            pad(addr_colored(result.addr), ADDR_WIDTH),
            pad(latency_colored(result.min, threshold), 6),
            pad(latency_colored(result.max, threshold), 6),
            pad(latency_colored(result.avg, threshold), 6),
            loss,
        ));
    }
    omitted(results.len(), limit);
}

fn omitted(total: usize, limit: usize) {
    if total > limit {
        let more = format!("... {} more rows in the exported table", total - limit);
        print(&format!("{}", more.color(colors::SEPARATOR).italic()));
    }
}

pub fn datacenters(summaries: &[DatacenterSummary]) {
    column_header(&[("DC", 5), ("CITY", 18), ("HITS", 6), ("FASTEST", 8)]);
    for summary in summaries {
        print(&format!(
            "{} {} {} {}",
            pad(summary.code.as_str().color(colors::PRIMARY), 5),
            pad(summary.city.as_str().color(colors::TEXT_DEFAULT), 18),
            pad(summary.count.to_string().color(colors::ACCENT), 6),
            ms(summary.min_latency).color(colors::TEXT_DEFAULT),
        ));
    }
}

/// One bar per 10% loss bucket.
pub fn loss_histogram(buckets: &[LossBucket]) {
    for bucket in buckets {
        let label = match bucket.floor {
            100 => "  100%".to_string(),
            floor => format!("{:>3}-{:<2}", floor, floor + 9),
        };
        let filled = ((bucket.share / 100.0) * BAR_WIDTH as f64).round() as usize;
        let bar = format!(
            "{}{}",
            "█".repeat(filled).color(colors::PRIMARY),
            "░"
                .repeat(BAR_WIDTH - filled.min(BAR_WIDTH))
                .color(colors::SEPARATOR)
        );
        let mean = bucket
            .mean_min_latency
            .map(|l| format!(" min avg {}", ms(l)))
            .unwrap_or_default();
        print(&format!(
            "{} {} {:>4} ({:>5.1}%){}",
            label.color(colors::TEXT_DEFAULT),
            bar,
            bucket.count,
            bucket.share,
            mean.color(colors::SEPARATOR),
        ));
    }
}
