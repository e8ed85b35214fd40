pub mod aggregator;
pub mod catalog;
pub mod diagnosis;
pub mod filter;
pub mod schedule;
pub mod status;

pub use aggregator::{FanOutPolicy, FanOutReport, PlantService};
pub use catalog::Catalog;
pub use filter::PlantFilter;
