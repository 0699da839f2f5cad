use super::resume_coordinate::StreamStart;
use crate::{BinlogReader, Sinker};
use rh_common::{log_debug, log_info, meta::binlog_event::BinlogEvent};

/// An open binlog stream positioned at the resume point, paired with the sink
/// its events are published to.
pub struct StreamHandle {
    reader: Box<dyn BinlogReader + Send>,
    sinker: Box<dyn Sinker + Send>,
    start: StreamStart,
    suppress_side_effects: bool,
    published_count: u64,
}

impl StreamHandle {
    pub fn new(
        reader: Box<dyn BinlogReader + Send>,
        sinker: Box<dyn Sinker + Send>,
        start: StreamStart,
        suppress_side_effects: bool,
    ) -> Self {
        Self {
            reader,
            sinker,
            start,
            suppress_side_effects,
            published_count: 0,
        }
    }

    pub fn start(&self) -> &StreamStart {
        &self.start
    }

    pub fn published_count(&self) -> u64 {
        self.published_count
    }

    pub async fn next(&mut self) -> anyhow::Result<BinlogEvent> {
        self.reader.next().await
    }

    pub async fn publish(&mut self, event: &BinlogEvent) -> anyhow::Result<()> {
        if self.suppress_side_effects {
            log_debug!("side effects suppressed, event not published: {:?}", event);
            return Ok(());
        }
        self.sinker.sink_event(event).await?;
        self.published_count += 1;
        Ok(())
    }

    /// Reads the next event and publishes it.
    pub async fn forward(&mut self) -> anyhow::Result<BinlogEvent> {
        let event = self.next().await?;
        self.publish(&event).await?;
        Ok(event)
    }

    pub async fn close(mut self) -> anyhow::Result<()> {
        log_info!(
            "closing stream started at [{}], published events: {}",
            self.start,
            self.published_count
        );
        self.sinker.close().await
    }
}
