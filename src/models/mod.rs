pub mod catalog_entry;
pub mod plant;
pub mod season;

pub use catalog_entry::*;
pub use plant::*;
pub use season::*;
