use std::sync::Arc;

use tokio::time::Instant;

use crate::resumer::{
    recorder::{to_database::DatabaseStateRecorder, to_log::LogStateRecorder, StateRecorder},
    state_store::{from_database::DatabaseStateStore, from_log::LogStateStore, GlobalStateStore},
    utils::ResumerUtil,
};
use rh_common::{config::resumer_config::ResumerConfig, log_info};

pub mod recorder;
pub mod state_store;
pub mod utils;

const GLOBAL_EVENT_STATE_LOG_FLAG: &str = "| global_event_state |";
const TAIL_POSITION_COUNT: usize = 200;
const DEFAULT_RESUMER_SCHEMA: &str = "rh_metadata";
const DEFAULT_RESUMER_TABLE: &str = "global_event_state";

pub async fn build_state_store(
    cluster_name: &str,
    resumer_config: &ResumerConfig,
) -> anyhow::Result<Arc<dyn GlobalStateStore + Send + Sync>> {
    let begin = Instant::now();
    let store: Arc<dyn GlobalStateStore + Send + Sync> = match resumer_config {
        ResumerConfig::FromDB {
            url,
            table_full_name,
            max_connections,
        } => {
            let pool = ResumerUtil::create_pool(url, *max_connections).await?;
            Arc::new(DatabaseStateStore::new(cluster_name, table_full_name, pool)?)
        }
        ResumerConfig::FromLog {
            log_dir,
            config_file,
        } => Arc::new(LogStateStore::new(log_dir, config_file)),
    };
    log_info!(
        "state store initialization for cluster: {} finished in {:?} ms",
        cluster_name,
        begin.elapsed().as_millis()
    );
    Ok(store)
}

pub async fn build_recorder(
    cluster_name: &str,
    resumer_config: &ResumerConfig,
) -> anyhow::Result<Arc<dyn StateRecorder + Send + Sync>> {
    match resumer_config {
        ResumerConfig::FromDB {
            url,
            table_full_name,
            max_connections,
        } => {
            let pool = ResumerUtil::create_pool(url, *max_connections).await?;
            let recorder = DatabaseStateRecorder::new(cluster_name, table_full_name, pool).await?;
            Ok(Arc::new(recorder))
        }
        ResumerConfig::FromLog { .. } => Ok(Arc::new(LogStateRecorder {})),
    }
}
