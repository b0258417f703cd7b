pub mod controller;
pub(crate) mod shared;
