pub mod tcp;
pub mod trace;
