mod infraction;
mod report;

pub use infraction::{CreateInfraction, Infraction, PendingInfraction, ReportWithInfractions};
pub use report::{CreateReport, Report, ReportFilter, ServiceType};
