pub mod models;
pub mod store;

pub use models::{Alert, DashboardStats, Maintenance, Vehicle, VehicleStatus};
pub use store::Database;
