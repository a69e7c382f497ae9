use std::fmt::Display;

use crate::terminal::colors;
use colored::*;
use edgeprobe_common::config::{Config, FamilySelection};
use tracing::info;
use unicode_width::UnicodeWidthStr;

pub const TOTAL_WIDTH: usize = 72;
pub const PRINT_TARGET: &str = "edgeprobe::print";

#[macro_export]
macro_rules! tprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub trait WithDefaultColor {
    fn with_default(self, default_color: Color) -> ColoredString;
}

impl WithDefaultColor for &str {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for String {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for ColoredString {
    fn with_default(self, _default_color: Color) -> ColoredString {
        self
    }
}

/// Raw terminal output, routed through tracing so it interleaves cleanly
/// with progress bars.
pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{msg}");
}

pub fn banner(quiet: bool) {
    if quiet {
        return;
    }

    let text_content: String = format!("⟦ EDGEPROBE v{} ⟧", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let side: usize = TOTAL_WIDTH.saturating_sub(text_width) / 2;
    let text: ColoredString = text_content.color(colors::PRIMARY).bold();
    let sep: ColoredString = "═".repeat(side).color(colors::SEPARATOR);

    print(&format!("{sep}{text}{sep}"));
}

pub fn header(msg: &str, quiet: bool) {
    if quiet {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = UnicodeWidthStr::width(formatted.as_str());

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    print(&format!(
        "{}{}{}",
        "─".repeat(left).color(colors::SEPARATOR),
        formatted.to_uppercase().color(colors::PRIMARY),
        "─".repeat(right).color(colors::SEPARATOR)
    ));
}

/// The settings that shape a run, one aligned line each.
pub fn settings(cfg: &Config, quiet: bool) {
    if quiet {
        return;
    }

    let families = match cfg.families {
        FamilySelection::V4 => "IPv4",
        FamilySelection::V6 => "IPv6",
        FamilySelection::Both => "IPv4 + IPv6",
    };
    let lines: Vec<(&str, String)> = vec![
        ("Families", families.to_string()),
        ("Scan", format!("{} probes, {} in flight", cfg.sample_target, cfg.scan_concurrency)),
        ("Test", format!("{} attempts, {} in flight", cfg.test_attempts, cfg.test_concurrency)),
        ("Ports", format!("trace {}, test {}", cfg.trace_port, cfg.port)),
        ("Threshold", format!("{}ms", cfg.threshold.as_millis())),
        ("Datacenter", cfg.datacenter.clone().unwrap_or_else(|| "any".to_string())),
    ];
    let key_width = lines.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in lines {
        aligned_line(key, value, key_width);
    }
}

pub fn fat_separator() {
    print(&format!("{}", "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)));
}

/// `key.....: value`, with keys padded to `key_width`.
pub fn aligned_line<V>(key: &str, value: V, key_width: usize)
where
    V: Display + WithDefaultColor,
{
    let dots: String = ".".repeat((key_width + 1).saturating_sub(key.len()));
    let colon: String = format!(
        "{}{}",
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR)
    );
    let value: ColoredString = value.with_default(colors::TEXT_DEFAULT);
    print_status(format!("{}{} {}", key.color(colors::PRIMARY), colon, value));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    print(&format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT)));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}", space, msg));
}

const NO_RESULTS: &str = r#"
         _  _  ___    ___ _  _ ___  ___  ___ ___ _  _ _____ ___ 
        | \| |/ _ \  | __| \| |   \| _ \/ _ \_ _| \| |_   _/ __|
        | .` | (_) | | _|| .` | |) |  _/ (_) | || .` | | | \__ \
        |_|\_|\___/  |___|_|\_|___/|_|  \___/___|_|\_| |_| |___/
"#;

pub fn no_results() {
    print(&format!("{}", NO_RESULTS.red().bold()));
}

pub fn end_of_program() {
    print(&format!("{}", "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)));
}
