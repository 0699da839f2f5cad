use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

#[derive(
    Clone,
    Display,
    EnumString,
    IntoStaticStr,
    Debug,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Hash,
)]
pub enum DbType {
    #[default]
    #[strum(serialize = "mysql")]
    Mysql,
}

#[derive(Display, EnumString, IntoStaticStr, PartialEq, Default, Clone, Debug)]
pub enum ResumeType {
    #[default]
    #[strum(serialize = "from_log")]
    FromLog,
    #[strum(serialize = "from_db")]
    FromDB,
}

#[derive(Display, EnumString, IntoStaticStr, PartialEq, Default, Clone, Debug)]
pub enum BootstrapType {
    #[default]
    #[strum(serialize = "disabled")]
    Disabled,
    #[strum(serialize = "from_config")]
    FromConfig,
    #[strum(serialize = "from_source")]
    FromSource,
}

#[derive(Display, EnumString, IntoStaticStr, Clone, Debug, Default, PartialEq)]
pub enum SinkType {
    #[default]
    #[strum(serialize = "dummy")]
    Dummy,
    #[strum(serialize = "log")]
    Log,
}
