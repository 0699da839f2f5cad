use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;

use super::resume_coordinate::{ResumeCoordinate, StreamStart};
use crate::extractor::binlog_inventory::BinlogInventory;
use rh_common::{
    error::Error,
    log_info,
    meta::{
        global_event_state::{EventType, PersistedStreamState},
        gtid_set::GtidSet,
        position::Position,
    },
};

#[async_trait]
pub trait PositionFinder {
    /// Where tailing must resume so that no event is skipped or re-applied
    /// against the wrong schema.
    async fn get_position_to_resume_tailing_from(
        &self,
        state: &PersistedStreamState,
        dump_exists: bool,
    ) -> anyhow::Result<ResumeCoordinate>;

    /// Fails with PositionUnresolvable if the source no longer holds `start`.
    async fn validate(&self, start: &StreamStart) -> anyhow::Result<()>;
}

pub struct BinlogPositionFinder {
    inventory: Arc<dyn BinlogInventory + Send + Sync>,
}

impl BinlogPositionFinder {
    pub fn new(inventory: Arc<dyn BinlogInventory + Send + Sync>) -> Self {
        Self { inventory }
    }

    /// Coordinate right after the event at `position`.
    pub fn after(position: &Position) -> anyhow::Result<ResumeCoordinate> {
        match position {
            Position::MysqlBinlog {
                binlog_filename,
                binlog_position,
                next_event_position,
            } => {
                if *next_event_position == 0 || next_event_position < binlog_position {
                    bail!(Error::PositionUnresolvable(format!(
                        "no valid next event position recorded in: {}",
                        position
                    )))
                }
                if next_event_position == binlog_position {
                    // nothing was processed at this position yet
                    return Ok(ResumeCoordinate::default());
                }
                Ok(ResumeCoordinate::binlog(binlog_filename, *next_event_position))
            }
            // the executed set already includes the event
            Position::MysqlGtid { .. } => Ok(ResumeCoordinate::default()),
            Position::None => bail!(Error::PositionUnresolvable(
                "no recorded position".into()
            )),
        }
    }

    /// Coordinate of the event at `position` itself, so it is read again.
    pub fn at(position: &Position) -> anyhow::Result<ResumeCoordinate> {
        match position {
            Position::MysqlBinlog { .. } => Ok(ResumeCoordinate::default()),
            Position::MysqlGtid {
                gtid_set,
                last_gtid,
            } => {
                if last_gtid.is_empty() {
                    bail!(Error::PositionUnresolvable(format!(
                        "last gtid unknown, can not step back before the event in: {}",
                        position
                    )))
                }
                let mut executed = GtidSet::parse(gtid_set)?;
                executed.remove(last_gtid)?;
                Ok(ResumeCoordinate::gtid(&executed.to_string()))
            }
            Position::None => bail!(Error::PositionUnresolvable(
                "no recorded position".into()
            )),
        }
    }
}

#[async_trait]
impl PositionFinder for BinlogPositionFinder {
    async fn get_position_to_resume_tailing_from(
        &self,
        state: &PersistedStreamState,
        dump_exists: bool,
    ) -> anyhow::Result<ResumeCoordinate> {
        let coordinate = match state.event_type {
            EventType::DataEvent => Self::after(&state.position)?,
            EventType::SchemaEvent if !state.is_clean_shutdown && dump_exists => {
                Self::at(&state.position)?
            }
            EventType::SchemaEvent => Self::after(&state.position)?,
        };

        let start = coordinate.resolve(&state.position)?;
        self.validate(&start).await?;
        log_info!(
            "resume coordinate for {} state at {}: {}",
            state.event_type,
            state.position,
            start
        );
        Ok(coordinate)
    }

    async fn validate(&self, start: &StreamStart) -> anyhow::Result<()> {
        match start {
            StreamStart::Binlog {
                binlog_filename,
                binlog_position,
            } => {
                let binary_logs = self.inventory.binary_logs().await?;
                let Some(binary_log) = binary_logs.iter().find(|b| &b.name == binlog_filename)
                else {
                    bail!(Error::PositionUnresolvable(format!(
                        "binlog file {} has been purged from the source",
                        binlog_filename
                    )))
                };
                if *binlog_position as u64 > binary_log.size {
                    bail!(Error::PositionUnresolvable(format!(
                        "binlog position {}:{} is beyond the file size {}",
                        binlog_filename, binlog_position, binary_log.size
                    )))
                }
            }

            StreamStart::Gtid { gtid_set } => {
                let start_set = GtidSet::parse(gtid_set)?;
                let purged = self.inventory.purged_gtid_set().await?;
                if !start_set.contains_set(&purged) {
                    bail!(Error::PositionUnresolvable(format!(
                        "gtid set [{}] misses transactions already purged from the source: [{}]",
                        gtid_set, purged
                    )))
                }
            }
        }
        Ok(())
    }
}
