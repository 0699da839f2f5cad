pub mod dummy_sinker;
pub mod log_sinker;
