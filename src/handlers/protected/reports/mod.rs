pub mod completion;

pub use completion::completion_get;
