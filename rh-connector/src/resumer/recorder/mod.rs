use async_trait::async_trait;

use rh_common::meta::global_event_state::PersistedStreamState;

pub mod to_database;
pub mod to_log;

#[async_trait]
pub trait StateRecorder {
    async fn record(&self, state: &PersistedStreamState) -> anyhow::Result<()>;
}
