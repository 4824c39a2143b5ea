pub mod level;
pub mod tree;

pub use level::AdminLevel;
pub use tree::{GeoError, GeographicTree, NodeRef};
