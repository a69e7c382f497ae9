pub mod range;
pub mod sampler;

pub use range::{AddressRange, Family};
pub use sampler::Sampler;
