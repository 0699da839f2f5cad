use async_trait::async_trait;

use crate::Sinker;
use rh_common::{
    log_sink,
    meta::{
        binlog_event::{BinlogEvent, BinlogEventKind},
        position::Position,
    },
};

/// Writes every event to the sink log, one line each.
#[derive(Default)]
pub struct LogSinker {
    last_published: Option<Position>,
}

#[async_trait]
impl Sinker for LogSinker {
    async fn sink_event(&mut self, event: &BinlogEvent) -> anyhow::Result<()> {
        match &event.kind {
            BinlogEventKind::Ddl { schema, query } => {
                log_sink!("ddl, schema: {}, query: {}, position: {}", schema, query, event.position)
            }
            BinlogEventKind::Rows {
                schema,
                tb,
                change,
                row_count,
            } => log_sink!(
                "{}, table: {}.{}, rows: {}, position: {}",
                change,
                schema,
                tb,
                row_count,
                event.position
            ),
            BinlogEventKind::Commit { xid } => {
                log_sink!("commit, xid: {}, position: {}", xid, event.position)
            }
            BinlogEventKind::Other { event_type } => {
                log_sink!("event_type: {}, position: {}", event_type, event.position)
            }
        }
        self.last_published = Some(event.position.clone());
        Ok(())
    }

    async fn last_published_position(&self) -> anyhow::Result<Option<Position>> {
        Ok(self.last_published.clone())
    }
}
