pub mod admin;
pub mod geo;
pub mod question;
pub mod submission;

pub use admin::{AdminStatus, Administrator};
pub use geo::{DistrictRow, DivisionRow, RegionRow, UnitRow};
pub use question::RequiredQuestionRow;
pub use submission::{ResponseRecord, ReviewDecision, Submission};
