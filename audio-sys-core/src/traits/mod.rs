pub mod callbacks;
pub mod platform;
