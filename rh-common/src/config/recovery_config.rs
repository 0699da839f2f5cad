use crate::meta::position::Position;

#[derive(Clone, Debug, PartialEq)]
pub enum BootstrapConfig {
    Disabled,
    FromConfig { position: Position },
    FromSource,
}

#[derive(Clone, Debug)]
pub struct RecoveryConfig {
    pub dump_dir: String,
    pub schema_cache_file: String,
    pub bootstrap: BootstrapConfig,
    pub timeout_secs: u64,
    pub suppress_side_effects: bool,
}
