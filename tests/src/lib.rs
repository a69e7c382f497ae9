//! End-to-end checks across the edgeprobe crates.

#[cfg(test)]
mod files;
#[cfg(test)]
mod loopback;
#[cfg(test)]
mod pipeline;
#[cfg(test)]
mod util;
