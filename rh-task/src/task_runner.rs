use std::{panic, sync::Arc, sync::Mutex as StdMutex};

use anyhow::bail;
use log4rs::config::{Config, Deserializers, RawConfig};
use tokio::{
    fs::{metadata, File},
    io::AsyncReadExt,
    select,
};

use super::task_util::TaskUtil;
use rh_common::{
    config::task_config::TaskConfig,
    log_error, log_info, log_warn,
    meta::{
        binlog_event::{BinlogEvent, BinlogEventKind},
        global_event_state::{EventType, PersistedStreamState},
        position::Position,
        schema_snapshot::SchemaDump,
    },
    utils::time_util::TimeUtil,
};
use rh_connector::{
    dump::{file_dump_handler::FileDumpHandler, DumpHandler},
    restarter::stream_handle::StreamHandle,
    resumer::{build_recorder, recorder::StateRecorder},
    schema::{
        file_schema_cache::FileSchemaCache, mysql_schema_probe::MysqlSchemaProbe, SchemaCache,
        SchemaProbe,
    },
};

static LOG_HANDLE: StdMutex<Option<log4rs::Handle>> = StdMutex::new(None);

const LOG_LEVEL_PLACEHOLDER: &str = "LOG_LEVEL_PLACEHOLDER";
const LOG_DIR_PLACEHOLDER: &str = "LOG_DIR_PLACEHOLDER";

pub struct TaskRunner {
    config: TaskConfig,
}

struct TailContext {
    dump_handler: Arc<dyn DumpHandler + Send + Sync>,
    schema_cache: Arc<dyn SchemaCache + Send + Sync>,
    schema_probe: Arc<dyn SchemaProbe + Send + Sync>,
    recorder: Arc<dyn StateRecorder + Send + Sync>,
}

impl TaskRunner {
    pub fn new(task_config_file: &str) -> anyhow::Result<Self> {
        let config = TaskConfig::new(task_config_file)?;
        Ok(Self { config })
    }

    pub async fn start_task(&self) -> anyhow::Result<()> {
        self.init_log4rs().await?;

        panic::set_hook(Box::new(|panic_info| {
            let backtrace = std::backtrace::Backtrace::capture();
            log_error!("panic: {}\nbacktrace:\n{}", panic_info, backtrace);
        }));

        let cluster_name = &self.config.global.cluster_name;
        log_info!("start task: [cluster: {}]", cluster_name);

        let extractor = &self.config.extractor;
        let conn_pool =
            TaskUtil::create_mysql_conn_pool(&extractor.url, extractor.max_connections, false)
                .await?;

        let dump_handler = Arc::new(FileDumpHandler::new(
            &self.config.recovery.dump_dir,
            cluster_name,
        ));
        let schema_cache: Arc<dyn SchemaCache + Send + Sync> = Arc::new(FileSchemaCache::new(
            &self.config.recovery.schema_cache_file,
        ));
        let schema_probe: Arc<dyn SchemaProbe + Send + Sync> = Arc::new(MysqlSchemaProbe::new(
            conn_pool.clone(),
            extractor.schema_dbs.clone(),
        ));
        let recorder = build_recorder(cluster_name, &self.config.resumer).await?;

        let mut restarter = TaskUtil::build_restarter(
            &self.config,
            conn_pool,
            dump_handler.clone(),
            schema_cache.clone(),
            schema_probe.clone(),
        )
        .await?;
        let sinker = TaskUtil::build_sinker(&self.config.sinker);
        let handle = match restarter.restart(sinker).await {
            Ok(handle) => handle,
            Err(err) => {
                log_error!("restart failed: {:#}", err);
                return Err(err);
            }
        };

        let context = TailContext {
            dump_handler,
            schema_cache,
            schema_probe,
            recorder,
        };
        self.tail(handle, &context).await
    }

    async fn tail(&self, mut handle: StreamHandle, context: &TailContext) -> anyhow::Result<()> {
        let suppress_side_effects = self.config.recovery.suppress_side_effects;
        let checkpoint_interval = self.config.runtime.checkpoint_interval;
        let mut commit_count = 0;
        // last event a restart may resume after: a commit or a schema event
        let mut last_checkpoint: Option<(EventType, Position)> = None;

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            select! {
                res = &mut shutdown => {
                    if let Err(err) = res {
                        log_warn!("failed to listen for shutdown signal: {}", err);
                    }
                    log_info!("shutdown signal received");
                    break;
                }

                event = handle.next() => {
                    let event = event?;
                    match &event.kind {
                        BinlogEventKind::Ddl { .. } => {
                            self.apply_schema_event(&mut handle, &event, context).await?;
                            last_checkpoint = Some((EventType::SchemaEvent, event.position.clone()));
                        }

                        BinlogEventKind::Commit { .. } => {
                            handle.publish(&event).await?;
                            last_checkpoint = Some((EventType::DataEvent, event.position.clone()));
                            commit_count += 1;
                            if commit_count % checkpoint_interval == 0 && !suppress_side_effects {
                                let state = PersistedStreamState::new(
                                    EventType::DataEvent,
                                    event.position.clone(),
                                    false,
                                );
                                context.recorder.record(&state).await?;
                            }
                        }

                        BinlogEventKind::Rows { .. } => handle.publish(&event).await?,

                        BinlogEventKind::Other { .. } => {}
                    }
                }
            }
        }

        match last_checkpoint {
            Some((event_type, position)) if !suppress_side_effects => {
                let state = PersistedStreamState::new(event_type, position, true);
                context.recorder.record(&state).await?;
                log_info!("clean shutdown recorded: {}", state);
            }
            Some(_) => log_info!("side effects suppressed, clean shutdown not recorded"),
            None => log_info!("no event processed since restart, stream state unchanged"),
        }
        handle.close().await
    }

    /// Dumps the schema in effect before the event, publishes the event, then
    /// records it. The dump only outlives this call if the process dies in between.
    async fn apply_schema_event(
        &self,
        handle: &mut StreamHandle,
        event: &BinlogEvent,
        context: &TailContext,
    ) -> anyhow::Result<()> {
        if self.config.recovery.suppress_side_effects {
            log_info!(
                "side effects suppressed, schema event at {} not applied",
                event.position
            );
            return Ok(());
        }

        let dump = SchemaDump {
            position: event.position.clone(),
            snapshot: context.schema_cache.snapshot().await?,
            created_at: TimeUtil::now_str(),
        };
        context.dump_handler.create_dump(&dump).await?;

        handle.publish(event).await?;
        let live = context.schema_probe.probe().await?;
        context.schema_cache.replace(&live).await?;

        let state = PersistedStreamState::new(EventType::SchemaEvent, event.position.clone(), false);
        context.recorder.record(&state).await?;
        context.dump_handler.delete_dump().await
    }

    async fn init_log4rs(&self) -> anyhow::Result<()> {
        let log4rs_file = &self.config.runtime.log4rs_file;
        if metadata(log4rs_file).await.is_err() {
            return Ok(());
        }

        let mut config_str = String::new();
        let mut file = File::open(log4rs_file).await?;
        file.read_to_string(&mut config_str).await?;

        config_str = config_str
            .replace(LOG_DIR_PLACEHOLDER, &self.config.runtime.log_dir)
            .replace(LOG_LEVEL_PLACEHOLDER, &self.config.runtime.log_level);

        let raw: RawConfig = serde_yaml::from_str(&config_str)?;
        let (appenders, errors) = raw.appenders_lossy(&Deserializers::default());
        if !errors.is_empty() {
            bail!("errors deserializing appenders: {:?}", errors);
        }

        let config = Config::builder()
            .appenders(appenders)
            .loggers(raw.loggers())
            .build(raw.root())?;
        let mut handle_guard = LOG_HANDLE
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = handle_guard.as_ref() {
            // refresh log4rs config in one process
            handle.set_config(config);
        } else {
            let handle = log4rs::init_config(config)?;
            *handle_guard = Some(handle);
        }
        Ok(())
    }
}
