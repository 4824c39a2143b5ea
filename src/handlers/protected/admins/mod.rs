pub mod create;
pub mod list;
pub mod record;

pub use create::admin_create;
pub use list::admins_list;
pub use record::{admin_delete, admin_get, admin_update};
