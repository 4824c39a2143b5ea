pub mod browse;

pub use browse::{districts_get, divisions_get, regions_get, units_get};
