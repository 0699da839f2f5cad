use anyhow::{bail, Context};

use super::{
    config_enums::{BootstrapType, DbType, ResumeType},
    extractor_config::ExtractorConfig,
    ini_loader::IniLoader,
    recovery_config::{BootstrapConfig, RecoveryConfig},
    resumer_config::ResumerConfig,
    runtime_config::RuntimeConfig,
    sinker_config::SinkerConfig,
};
use crate::{
    error::Error,
    meta::{gtid_set::GtidSet, position::Position},
};

#[derive(Clone, Debug)]
pub struct GlobalConfig {
    pub cluster_name: String,
}

#[derive(Clone, Debug)]
pub struct TaskConfig {
    pub global: GlobalConfig,
    pub extractor: ExtractorConfig,
    pub resumer: ResumerConfig,
    pub recovery: RecoveryConfig,
    pub sinker: SinkerConfig,
    pub runtime: RuntimeConfig,
}

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 100;

// sections
const GLOBAL: &str = "global";
const EXTRACTOR: &str = "extractor";
const RESUMER: &str = "resumer";
const RECOVERY: &str = "recovery";
const SINKER: &str = "sinker";
const RUNTIME: &str = "runtime";
// keys
const DB_TYPE: &str = "db_type";
const URL: &str = "url";
const MAX_CONNECTIONS: &str = "max_connections";
const LOG_DIR: &str = "log_dir";
const BOOTSTRAP_BINLOG_FILENAME: &str = "bootstrap_binlog_filename";
const BOOTSTRAP_BINLOG_POSITION: &str = "bootstrap_binlog_position";
const BOOTSTRAP_GTID_SET: &str = "bootstrap_gtid_set";
// default values
const DEFAULT_CLUSTER_NAME: &str = "primary";
const RESUMER_CONNECTION_LIMIT_DEFAULT: u32 = 2;
const RECOVERY_TIMEOUT_SECS_DEFAULT: u64 = 30;

impl TaskConfig {
    pub fn new(task_config_file: &str) -> anyhow::Result<Self> {
        let loader = IniLoader::new(task_config_file)?;
        Self::from_loader(&loader)
            .with_context(|| format!("invalid configs in [{}]", task_config_file))
    }

    pub fn from_loader(loader: &IniLoader) -> anyhow::Result<Self> {
        let runtime = Self::load_runtime_config(loader)?;
        let extractor = Self::load_extractor_config(loader)?;
        Ok(Self {
            global: Self::load_global_config(loader)?,
            resumer: Self::load_resumer_config(loader, &runtime)?,
            recovery: Self::load_recovery_config(loader, &extractor)?,
            sinker: Self::load_sinker_config(loader)?,
            extractor,
            runtime,
        })
    }

    fn load_global_config(loader: &IniLoader) -> anyhow::Result<GlobalConfig> {
        Ok(GlobalConfig {
            cluster_name: loader.get_with_default(
                GLOBAL,
                "cluster_name",
                DEFAULT_CLUSTER_NAME.to_string(),
            )?,
        })
    }

    fn load_extractor_config(loader: &IniLoader) -> anyhow::Result<ExtractorConfig> {
        let db_type: DbType = loader.get_required(EXTRACTOR, DB_TYPE)?;
        let schema_dbs: String = loader.get_optional(EXTRACTOR, "schema_dbs")?;
        Ok(ExtractorConfig {
            db_type,
            url: loader.get_required(EXTRACTOR, URL)?,
            server_id: loader.get_required(EXTRACTOR, "server_id")?,
            gtid_enabled: loader.get_optional(EXTRACTOR, "gtid_enabled")?,
            binlog_heartbeat_interval_secs: loader.get_with_default(
                EXTRACTOR,
                "binlog_heartbeat_interval_secs",
                10,
            )?,
            binlog_timeout_secs: loader.get_with_default(EXTRACTOR, "binlog_timeout_secs", 60)?,
            max_connections: loader.get_with_default(
                EXTRACTOR,
                MAX_CONNECTIONS,
                DEFAULT_MAX_CONNECTIONS,
            )?,
            schema_dbs: schema_dbs
                .split(',')
                .map(|db| db.trim().to_string())
                .filter(|db| !db.is_empty())
                .collect(),
        })
    }

    fn load_resumer_config(
        loader: &IniLoader,
        runtime: &RuntimeConfig,
    ) -> anyhow::Result<ResumerConfig> {
        let resume_type = loader.get_optional::<ResumeType>(RESUMER, "resume_type")?;
        match resume_type {
            ResumeType::FromLog => Ok(ResumerConfig::FromLog {
                log_dir: loader.get_with_default(RESUMER, LOG_DIR, runtime.log_dir.clone())?,
                config_file: loader.get_optional(RESUMER, "config_file")?,
            }),
            ResumeType::FromDB => Ok(ResumerConfig::FromDB {
                url: loader.get_required(RESUMER, URL)?,
                table_full_name: loader.get_optional(RESUMER, "table_full_name")?,
                max_connections: loader.get_with_default(
                    RESUMER,
                    MAX_CONNECTIONS,
                    RESUMER_CONNECTION_LIMIT_DEFAULT,
                )?,
            }),
        }
    }

    fn load_recovery_config(
        loader: &IniLoader,
        extractor: &ExtractorConfig,
    ) -> anyhow::Result<RecoveryConfig> {
        Ok(RecoveryConfig {
            dump_dir: loader.get_with_default(RECOVERY, "dump_dir", "./dumps".to_string())?,
            schema_cache_file: loader.get_with_default(
                RECOVERY,
                "schema_cache_file",
                "./schema_cache.json".to_string(),
            )?,
            bootstrap: Self::load_bootstrap_config(loader, extractor)?,
            timeout_secs: loader.get_with_default(
                RECOVERY,
                "timeout_secs",
                RECOVERY_TIMEOUT_SECS_DEFAULT,
            )?,
            suppress_side_effects: loader.get_optional(RECOVERY, "suppress_side_effects")?,
        })
    }

    fn load_bootstrap_config(
        loader: &IniLoader,
        extractor: &ExtractorConfig,
    ) -> anyhow::Result<BootstrapConfig> {
        let bootstrap_type = loader.get_optional::<BootstrapType>(RECOVERY, "bootstrap_type")?;
        match bootstrap_type {
            BootstrapType::Disabled => Ok(BootstrapConfig::Disabled),
            BootstrapType::FromSource => Ok(BootstrapConfig::FromSource),
            BootstrapType::FromConfig => {
                let position = if extractor.gtid_enabled {
                    let gtid_set: String = loader.get_required(RECOVERY, BOOTSTRAP_GTID_SET)?;
                    // normalize the text so later comparisons are stable
                    let gtid_set = GtidSet::parse(&gtid_set)?;
                    Position::MysqlGtid {
                        gtid_set: gtid_set.to_string(),
                        last_gtid: String::new(),
                    }
                } else {
                    let binlog_position: u32 =
                        loader.get_required(RECOVERY, BOOTSTRAP_BINLOG_POSITION)?;
                    Position::MysqlBinlog {
                        binlog_filename: loader.get_required(RECOVERY, BOOTSTRAP_BINLOG_FILENAME)?,
                        binlog_position,
                        next_event_position: binlog_position,
                    }
                };
                Ok(BootstrapConfig::FromConfig { position })
            }
        }
    }

    fn load_sinker_config(loader: &IniLoader) -> anyhow::Result<SinkerConfig> {
        Ok(SinkerConfig {
            sink_type: loader.get_optional(SINKER, "sink_type")?,
        })
    }

    fn load_runtime_config(loader: &IniLoader) -> anyhow::Result<RuntimeConfig> {
        let checkpoint_interval: usize = loader.get_with_default(
            RUNTIME,
            "checkpoint_interval",
            DEFAULT_CHECKPOINT_INTERVAL,
        )?;
        if checkpoint_interval == 0 {
            bail!(Error::ConfigError(
                "config [runtime].checkpoint_interval should be greater than 0".into()
            ))
        }
        Ok(RuntimeConfig {
            log_level: loader.get_with_default(RUNTIME, "log_level", "info".to_string())?,
            log_dir: loader.get_with_default(RUNTIME, LOG_DIR, "./logs".to_string())?,
            log4rs_file: loader.get_with_default(
                RUNTIME,
                "log4rs_file",
                "./log4rs.yaml".to_string(),
            )?,
            checkpoint_interval,
        })
    }
}
