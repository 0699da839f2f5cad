pub mod config_enums;
pub mod extractor_config;
pub mod ini_loader;
pub mod recovery_config;
pub mod resumer_config;
pub mod runtime_config;
pub mod sinker_config;
pub mod task_config;
