mod report_service;
mod report_store;

#[cfg(test)]
pub use report_service::generate_protocol_number;
pub use report_service::{ReportService, ReportSet, ReportSubmission};
pub use report_store::{PgReportStore, ReportStore};
