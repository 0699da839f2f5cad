use async_trait::async_trait;

use rh_common::meta::{binlog_event::BinlogEvent, position::Position};

pub mod dump;
pub mod extractor;
pub mod restarter;
pub mod resumer;
pub mod schema;
pub mod sinker;

#[async_trait]
pub trait Sinker {
    async fn sink_event(&mut self, event: &BinlogEvent) -> anyhow::Result<()>;

    /// Position of the last event the downstream acknowledged, if the sink knows it.
    async fn last_published_position(&self) -> anyhow::Result<Option<Position>>;

    async fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
pub trait BinlogReader {
    /// Next event in log order, waits until one is available.
    async fn next(&mut self) -> anyhow::Result<BinlogEvent>;
}
