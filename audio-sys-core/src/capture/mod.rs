pub mod scratch;
pub(crate) mod worker;
