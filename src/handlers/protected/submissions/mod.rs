pub mod draft;
pub mod record;
pub mod review;

pub use draft::{answers_put, submissions_post};
pub use record::{submission_get, submissions_list};
pub use review::{approve_post, return_post, submit_post};
