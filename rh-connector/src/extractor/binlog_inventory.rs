use anyhow::{bail, Context};
use async_trait::async_trait;
use sqlx::{query, query_scalar, MySql, Pool, Row};

use rh_common::meta::{gtid_set::GtidSet, position::Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryLog {
    pub name: String,
    pub size: u64,
}

/// What the source server currently keeps in its replication log.
#[async_trait]
pub trait BinlogInventory {
    async fn binary_logs(&self) -> anyhow::Result<Vec<BinaryLog>>;

    async fn purged_gtid_set(&self) -> anyhow::Result<GtidSet>;

    /// The source's current write position, used to bootstrap a fresh deployment.
    async fn current_position(&self, gtid_enabled: bool) -> anyhow::Result<Position>;
}

pub struct MysqlBinlogInventory {
    conn_pool: Pool<MySql>,
}

impl MysqlBinlogInventory {
    pub fn new(conn_pool: Pool<MySql>) -> Self {
        Self { conn_pool }
    }
}

#[async_trait]
impl BinlogInventory for MysqlBinlogInventory {
    async fn binary_logs(&self) -> anyhow::Result<Vec<BinaryLog>> {
        let rows = query("SHOW BINARY LOGS")
            .fetch_all(&self.conn_pool)
            .await
            .context("failed to list binary logs")?;

        let mut binary_logs = Vec::with_capacity(rows.len());
        for row in rows {
            binary_logs.push(BinaryLog {
                name: row.try_get("Log_name")?,
                size: row.try_get("File_size")?,
            });
        }
        Ok(binary_logs)
    }

    async fn purged_gtid_set(&self) -> anyhow::Result<GtidSet> {
        let purged: String = query_scalar("SELECT CAST(@@GLOBAL.gtid_purged AS CHAR)")
            .fetch_one(&self.conn_pool)
            .await
            .context("failed to query gtid_purged")?;
        GtidSet::parse(&purged)
    }

    async fn current_position(&self, gtid_enabled: bool) -> anyhow::Result<Position> {
        let row = query("SHOW MASTER STATUS")
            .fetch_optional(&self.conn_pool)
            .await
            .context("failed to query master status")?;
        let row = match row {
            Some(row) => row,
            None => bail!("binary logging is not enabled on the source"),
        };

        if gtid_enabled {
            let executed: String = row.try_get("Executed_Gtid_Set")?;
            return Ok(Position::MysqlGtid {
                gtid_set: GtidSet::parse(&executed)?.to_string(),
                last_gtid: String::new(),
            });
        }

        let binlog_filename: String = row.try_get("File")?;
        let binlog_position: u64 = row.try_get("Position")?;
        let binlog_position = u32::try_from(binlog_position)
            .with_context(|| format!("binlog position out of range: {}", binlog_position))?;
        Ok(Position::MysqlBinlog {
            binlog_filename,
            binlog_position,
            // nothing has been processed yet, the next event starts right here
            next_event_position: binlog_position,
        })
    }
}
