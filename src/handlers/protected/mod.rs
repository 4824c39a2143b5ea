pub mod admins;
pub mod auth;
pub mod geo;
pub mod reports;
pub mod submissions;
