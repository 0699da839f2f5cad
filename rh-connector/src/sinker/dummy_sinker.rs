use async_trait::async_trait;

use crate::Sinker;
use rh_common::{
    log_info,
    meta::{binlog_event::BinlogEvent, position::Position},
};

#[derive(Default)]
pub struct DummySinker {
    count: u64,
}

#[async_trait]
impl Sinker for DummySinker {
    async fn sink_event(&mut self, _event: &BinlogEvent) -> anyhow::Result<()> {
        self.count += 1;
        Ok(())
    }

    async fn last_published_position(&self) -> anyhow::Result<Option<Position>> {
        Ok(None)
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        log_info!("dummy sinker closed, events received: {}", self.count);
        Ok(())
    }
}
