pub mod position_finder;
pub mod recovery_handler;
pub mod replication_stream_restarter;
pub mod resume_coordinate;
pub mod stream_handle;
