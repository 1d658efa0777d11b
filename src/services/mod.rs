pub mod gauge;
pub mod seed;

pub use gauge::GaugeService;
