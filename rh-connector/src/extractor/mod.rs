use async_trait::async_trait;

use crate::{restarter::resume_coordinate::StreamStart, BinlogReader};

pub mod binlog_inventory;
pub mod mysql_binlog_reader;

#[async_trait]
pub trait StreamReaderFactory {
    async fn open(&self, start: &StreamStart) -> anyhow::Result<Box<dyn BinlogReader + Send>>;
}
