pub mod task_runner;
pub mod task_util;
