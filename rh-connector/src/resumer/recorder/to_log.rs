use async_trait::async_trait;

use crate::resumer::{recorder::StateRecorder, GLOBAL_EVENT_STATE_LOG_FLAG};
use rh_common::{
    log_position, meta::global_event_state::PersistedStreamState, utils::time_util::TimeUtil,
};

pub struct LogStateRecorder {}

#[async_trait]
impl StateRecorder for LogStateRecorder {
    async fn record(&self, state: &PersistedStreamState) -> anyhow::Result<()> {
        log_position!(
            "{} {} {}",
            TimeUtil::now_str(),
            GLOBAL_EVENT_STATE_LOG_FLAG,
            state
        );
        Ok(())
    }
}
