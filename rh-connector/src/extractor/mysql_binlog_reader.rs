use std::collections::HashMap;

use anyhow::{bail, Context};
use async_trait::async_trait;
use mysql_binlog_connector_rust::{
    binlog_client::BinlogClient, binlog_stream::BinlogStream, event::event_data::EventData,
};

use super::StreamReaderFactory;
use crate::{restarter::resume_coordinate::StreamStart, BinlogReader};
use rh_common::{
    config::extractor_config::ExtractorConfig,
    error::Error,
    log_debug, log_info,
    meta::{
        binlog_event::{BinlogEvent, BinlogEventKind, RowChange},
        gtid_set::GtidSet,
        position::Position,
    },
};

const DDL_PREFIXES: [&str; 5] = ["CREATE", "ALTER", "DROP", "RENAME", "TRUNCATE"];

pub struct MysqlStreamReaderFactory {
    url: String,
    server_id: u64,
    gtid_enabled: bool,
    binlog_heartbeat_interval_secs: u64,
    binlog_timeout_secs: u64,
}

impl MysqlStreamReaderFactory {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            url: config.url.clone(),
            server_id: config.server_id,
            gtid_enabled: config.gtid_enabled,
            binlog_heartbeat_interval_secs: config.binlog_heartbeat_interval_secs,
            binlog_timeout_secs: config.binlog_timeout_secs,
        }
    }
}

#[async_trait]
impl StreamReaderFactory for MysqlStreamReaderFactory {
    async fn open(&self, start: &StreamStart) -> anyhow::Result<Box<dyn BinlogReader + Send>> {
        let (binlog_filename, binlog_position, gtid_set) = match start {
            StreamStart::Binlog {
                binlog_filename,
                binlog_position,
            } if !self.gtid_enabled => (binlog_filename.clone(), *binlog_position, String::new()),
            StreamStart::Gtid { gtid_set } if self.gtid_enabled => {
                (String::new(), 0, gtid_set.clone())
            }
            _ => bail!(Error::ConfigError(format!(
                "stream start [{}] does not match gtid_enabled={}",
                start, self.gtid_enabled
            ))),
        };
        let executed = GtidSet::parse(&gtid_set)?;

        let mut client = BinlogClient {
            url: self.url.clone(),
            binlog_filename: binlog_filename.clone(),
            binlog_position,
            server_id: self.server_id,
            gtid_enabled: self.gtid_enabled,
            gtid_set,
            heartbeat_interval_secs: self.binlog_heartbeat_interval_secs,
            timeout_secs: self.binlog_timeout_secs,
        };
        let stream = client
            .connect()
            .await
            .with_context(|| format!("failed to open binlog stream at [{}]", start))?;
        log_info!("binlog stream opened at [{}]", start);

        Ok(Box::new(MysqlBinlogReader {
            stream,
            gtid_enabled: self.gtid_enabled,
            binlog_filename,
            executed,
            current_gtid: String::new(),
            table_map: HashMap::new(),
        }))
    }
}

pub struct MysqlBinlogReader {
    stream: BinlogStream,
    gtid_enabled: bool,
    binlog_filename: String,
    executed: GtidSet,
    current_gtid: String,
    // table_id -> (schema, tb)
    table_map: HashMap<u64, (String, String)>,
}

impl MysqlBinlogReader {
    fn position(&self, binlog_position: u32, next_event_position: u32) -> Position {
        if self.gtid_enabled {
            Position::MysqlGtid {
                gtid_set: self.executed.to_string(),
                last_gtid: self.current_gtid.clone(),
            }
        } else {
            Position::MysqlBinlog {
                binlog_filename: self.binlog_filename.clone(),
                binlog_position,
                next_event_position,
            }
        }
    }

    fn rows(&self, table_id: u64, change: RowChange, row_count: usize) -> BinlogEventKind {
        let (schema, tb) = self.table_map.get(&table_id).cloned().unwrap_or_default();
        BinlogEventKind::Rows {
            schema,
            tb,
            change,
            row_count,
        }
    }

    fn is_ddl(query: &str) -> bool {
        let query = query.trim_start().to_uppercase();
        DDL_PREFIXES.iter().any(|prefix| query.starts_with(prefix))
    }
}

#[async_trait]
impl BinlogReader for MysqlBinlogReader {
    async fn next(&mut self) -> anyhow::Result<BinlogEvent> {
        loop {
            let (header, data) = self.stream.read().await?;
            let next_event_position = header.next_event_position;
            let binlog_position = next_event_position.saturating_sub(header.event_length);

            let kind = match data {
                EventData::Rotate(rotate) => {
                    log_debug!("binlog rotated to: {}", rotate.binlog_filename);
                    self.binlog_filename = rotate.binlog_filename;
                    continue;
                }

                EventData::Gtid(gtid) => {
                    self.executed.add(&gtid.gtid)?;
                    self.current_gtid = gtid.gtid;
                    continue;
                }

                EventData::TableMap(table_map) => {
                    self.table_map.insert(
                        table_map.table_id,
                        (table_map.database_name, table_map.table_name),
                    );
                    continue;
                }

                EventData::Query(query) => {
                    if Self::is_ddl(&query.query) {
                        BinlogEventKind::Ddl {
                            schema: query.schema,
                            query: query.query,
                        }
                    } else {
                        BinlogEventKind::Other {
                            event_type: header.event_type,
                        }
                    }
                }

                EventData::WriteRows(w) => self.rows(w.table_id, RowChange::Insert, w.rows.len()),
                EventData::UpdateRows(u) => self.rows(u.table_id, RowChange::Update, u.rows.len()),
                EventData::DeleteRows(d) => self.rows(d.table_id, RowChange::Delete, d.rows.len()),
                EventData::Xid(xid) => BinlogEventKind::Commit { xid: xid.xid },

                _ => BinlogEventKind::Other {
                    event_type: header.event_type,
                },
            };

            return Ok(BinlogEvent::new(
                self.position(binlog_position, next_event_position),
                kind,
            ));
        }
    }
}
