pub mod aggregator;
pub mod catalogue;
pub mod providers;
pub mod title_details;
pub mod title_search;

pub use aggregator::Aggregator;
