pub mod completion;
pub mod signal;
