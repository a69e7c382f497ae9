//! # Edgeprobe Common
//!
//! Shared data model for the probing pipeline.
//!
//! * **[`network`]**: CIDR ranges and the random address sampler.
//! * **[`location`]**: datacenter code to region/city lookup.
//! * **[`results`]**: records produced by the scan and stability phases.
//! * **[`config`]**: the immutable run configuration.

pub mod config;
pub mod error;
pub mod location;
pub mod network;
pub mod results;

#[doc(hidden)]
pub use tracing;

/// Tracing target used for user-facing success lines.
pub const SUCCESS_TARGET: &str = "edgeprobe::success";

/// Logs a success line. Rendered with its own symbol by the terminal formatter.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: $crate::SUCCESS_TARGET, $($arg)*)
    };
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
