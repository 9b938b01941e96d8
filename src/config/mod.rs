pub mod pulse;

pub use pulse::PulseConfig;
