use async_trait::async_trait;

use rh_common::meta::global_event_state::PersistedStreamState;

pub mod from_database;
pub mod from_log;

/// Read side of the persisted stream state. `None` means nothing was ever recorded.
#[async_trait]
pub trait GlobalStateStore {
    async fn get(&self) -> anyhow::Result<Option<PersistedStreamState>>;
}
