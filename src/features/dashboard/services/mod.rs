mod aggregation;
mod dashboard_service;
mod sequencer;

pub use aggregation::aggregate;
pub use dashboard_service::DashboardService;
pub use sequencer::FetchSequencer;
