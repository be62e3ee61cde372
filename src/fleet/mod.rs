pub mod list;
pub mod stats;

pub use list::{SortKey, StatusFilter};
pub use stats::compute_stats;
