//! Business logic services, independent of the HTTP layer

pub mod lending_service;
pub mod reporting_service;

pub use lending_service::{LendingService, ReturnOutcome};
pub use reporting_service::{DashboardStats, ReportingService};
