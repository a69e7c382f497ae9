//! The identifying request sent after a phase-1 connect, and parsing of the
//! datacenter code out of its response.

use std::net::IpAddr;

pub const TRACE_PATH: &str = "/cdn-cgi/trace";
const USER_AGENT: &str = "Mozilla/5.0";
const COLO_KEY: &str = "colo=";
const UAG_KEY: &str = "uag=";

/// Builds the plain HTTP/1.1 trace request for `addr`.
pub fn request(addr: IpAddr) -> String {
    let host = match addr {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    };
    format!(
        "GET {TRACE_PATH} HTTP/1.1\r\nHost: {host}\r\n\
         User-Agent: {USER_AGENT}\r\nConnection: close\r\n\r\n"
    )
}

/// Extracts the datacenter code from a finished trace response.
///
/// The last line counts even without a terminator, since the peer has closed.
/// A code is only accepted when the response echoes our user agent and the
/// code is upper-case ASCII letters.
pub fn parse_datacenter(response: &str) -> Option<String> {
    datacenter_in(response.split('\n'))
}

/// Like [`parse_datacenter`], but ignores a trailing unterminated line that
/// may still be arriving.
pub fn parse_complete_lines(response: &str) -> Option<String> {
    let complete = response.rfind('\n').map_or("", |end| &response[..end]);
    datacenter_in(complete.split('\n'))
}

/// True once the buffered response holds a complete `colo=` line.
pub fn has_datacenter(response: &str) -> bool {
    parse_complete_lines(response).is_some()
}

fn datacenter_in<'a>(lines: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut echoed = false;
    let mut code = None;
    for line in lines.map(|line| line.trim_end_matches('\r')) {
        if line.strip_prefix(UAG_KEY) == Some(USER_AGENT) {
            echoed = true;
        } else if let Some(value) = line.strip_prefix(COLO_KEY) {
            if !value.is_empty() && value.bytes().all(|b| b.is_ascii_uppercase()) {
                code = Some(value);
            }
        }
    }
    code.filter(|_| echoed).map(str::to_string)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
