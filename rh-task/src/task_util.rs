use std::{str::FromStr, sync::Arc, time::Duration};

use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    ConnectOptions, MySql, Pool,
};

use rh_common::{
    config::{config_enums::SinkType, sinker_config::SinkerConfig, task_config::TaskConfig},
    log_info,
};
use rh_connector::{
    dump::{file_dump_handler::FileDumpHandler, DumpHandler},
    extractor::{
        binlog_inventory::MysqlBinlogInventory, mysql_binlog_reader::MysqlStreamReaderFactory,
    },
    restarter::{
        position_finder::BinlogPositionFinder,
        recovery_handler::SchemaRecoveryHandler,
        replication_stream_restarter::{ReplicationStreamRestarter, RestarterOptions},
    },
    resumer::build_state_store,
    schema::{SchemaCache, SchemaProbe},
    sinker::{dummy_sinker::DummySinker, log_sinker::LogSinker},
    Sinker,
};

pub struct TaskUtil {}

impl TaskUtil {
    pub async fn create_mysql_conn_pool(
        url: &str,
        max_connections: u32,
        enable_sqlx_log: bool,
    ) -> anyhow::Result<Pool<MySql>> {
        let mut conn_options = MySqlConnectOptions::from_str(url)?;
        conn_options = conn_options
            .log_statements(log::LevelFilter::Debug)
            .log_slow_statements(log::LevelFilter::Debug, Duration::from_secs(1));
        if !enable_sqlx_log {
            conn_options = conn_options.disable_statement_logging();
        }

        let conn_pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(conn_options)
            .await?;
        Ok(conn_pool)
    }

    pub async fn build_restarter(
        config: &TaskConfig,
        conn_pool: Pool<MySql>,
        dump_handler: Arc<FileDumpHandler>,
        schema_cache: Arc<dyn SchemaCache + Send + Sync>,
        schema_probe: Arc<dyn SchemaProbe + Send + Sync>,
    ) -> anyhow::Result<ReplicationStreamRestarter> {
        let state_store = build_state_store(&config.global.cluster_name, &config.resumer).await?;
        let inventory = Arc::new(MysqlBinlogInventory::new(conn_pool));
        let position_finder = Arc::new(BinlogPositionFinder::new(inventory.clone()));
        let recovery_handler = SchemaRecoveryHandler::new(
            dump_handler.clone() as Arc<dyn DumpHandler + Send + Sync>,
            schema_cache,
            schema_probe,
            config.recovery.suppress_side_effects,
        );
        let stream_factory = Arc::new(MysqlStreamReaderFactory::new(&config.extractor));

        let options = RestarterOptions {
            suppress_side_effects: config.recovery.suppress_side_effects,
            bootstrap: config.recovery.bootstrap.clone(),
            gtid_enabled: config.extractor.gtid_enabled,
            collaborator_timeout: Duration::from_secs(config.recovery.timeout_secs),
        };
        log_info!("restarter options: {:?}", options);

        Ok(ReplicationStreamRestarter::new(
            state_store,
            dump_handler,
            position_finder,
            Box::new(recovery_handler),
            inventory,
            stream_factory,
            options,
        ))
    }

    pub fn build_sinker(config: &SinkerConfig) -> Box<dyn Sinker + Send> {
        match config.sink_type {
            SinkType::Dummy => Box::new(DummySinker::default()),
            SinkType::Log => Box::new(LogSinker::default()),
        }
    }
}
