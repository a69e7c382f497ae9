//! # Edgeprobe Core
//!
//! The two-phase probing engine.
//!
//! 1. [`scanner`]: sample random addresses from CIDR ranges and keep the ones
//!    that answer, with their connect latency and datacenter.
//! 2. [`stability`]: re-test the fast survivors several times each and
//!    compute loss and latency statistics.
//!
//! [`rank`] orders both phases, [`export`] persists them, [`analysis`] picks
//! phase-2 candidates and builds the summaries. [`remote`] fetches missing
//! input files once and caches them. Network access goes through
//! the [`probe::Prober`] trait.

pub mod analysis;
pub mod export;
pub mod network;
pub mod probe;
pub mod rank;
pub mod remote;
pub mod scanner;
pub mod sources;
pub mod stability;

pub use probe::{ProbeReply, Prober};
