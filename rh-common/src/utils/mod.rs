pub mod file_util;
pub mod time_util;
