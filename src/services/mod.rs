pub mod admin_service;
pub mod geo_service;
pub mod question_service;
pub mod report_service;
pub mod submission_service;

pub use admin_service::{
    hash_password, verify_password, AdminError, AdminService, AdminUpdate, NewAdministrator,
};
pub use geo_service::{GeoImport, GeoImportReport, GeoService, GeoServiceError};
pub use question_service::{QuestionError, QuestionService};
pub use report_service::{ReportError, ReportService};
pub use submission_service::{SubmissionError, SubmissionService};
