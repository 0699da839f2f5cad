#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log4rs_file: String,
    pub checkpoint_interval: usize,
}
