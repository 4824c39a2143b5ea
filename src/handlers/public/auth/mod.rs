// Token acquisition endpoints that do not require authentication.
pub mod login;

pub use login::login_post;
