pub mod config;
pub mod error;
pub mod meta;
pub mod system_dbs;
pub mod utils;

pub const DEFAULT_LOGGER: &str = "default_logger";
pub const POSITION_LOGGER: &str = "position_logger";
pub const SINK_LOGGER: &str = "sink_logger";

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        log::debug!(target: $crate::DEFAULT_LOGGER, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        log::info!(target: $crate::DEFAULT_LOGGER, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => {
        log::warn!(target: $crate::DEFAULT_LOGGER, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        log::error!(target: $crate::DEFAULT_LOGGER, $($arg)+)
    };
}

// position lines are parsed back by LogStateStore, keep the format stable
#[macro_export]
macro_rules! log_position {
    ($($arg:tt)+) => {
        log::info!(target: $crate::POSITION_LOGGER, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_sink {
    ($($arg:tt)+) => {
        log::info!(target: $crate::SINK_LOGGER, $($arg)+)
    };
}
