//! Loading the range lists. One CIDR per line; blank lines and `#` comments
//! are ignored, malformed lines are skipped with a warning.

use std::fs;
use std::path::Path;

use edgeprobe_common::error::DatasetError;
use edgeprobe_common::network::AddressRange;
use tracing::{debug, warn};

/// Parses range-list text, skipping what does not parse.
pub fn parse_ranges(content: &str) -> Vec<AddressRange> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match line.parse::<AddressRange>() {
            Ok(range) => Some(range),
            Err(e) => {
                warn!("Skipping range: {e}");
                None
            }
        })
        .collect()
}

/// Loads a range file. A file with no usable line is an error.
pub fn load_ranges(path: &Path) -> Result<Vec<AddressRange>, DatasetError> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let ranges = parse_ranges(&content);
    if ranges.is_empty() {
        return Err(DatasetError::Empty {
            path: path.to_path_buf(),
        });
    }

    debug!("Loaded {} ranges from {}", ranges.len(), path.display());
    Ok(ranges)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
