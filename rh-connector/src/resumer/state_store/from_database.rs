use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{query, Error, MySql, Pool, Row};

use super::GlobalStateStore;
use crate::resumer::utils::ResumerUtil;
use rh_common::{
    log_info,
    meta::{
        global_event_state::{EventType, PersistedStreamState},
        position::Position,
    },
};

pub struct DatabaseStateStore {
    cluster_name: String,
    pool: Pool<MySql>,
    schema: String,
    table: String,
}

impl DatabaseStateStore {
    pub fn new(cluster_name: &str, table_full_name: &str, pool: Pool<MySql>) -> Result<Self> {
        let (schema, table) = ResumerUtil::get_full_table_name(table_full_name)?;
        Ok(Self {
            cluster_name: cluster_name.to_string(),
            pool,
            schema,
            table,
        })
    }
}

#[async_trait]
impl GlobalStateStore for DatabaseStateStore {
    async fn get(&self) -> Result<Option<PersistedStreamState>> {
        let sql = format!(
            "SELECT event_type, position, is_clean_shutdown FROM `{}`.`{}` WHERE cluster_name = ?",
            self.schema, self.table
        );

        let row = match query(&sql)
            .bind(&self.cluster_name)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(row) => row,
            Err(Error::Database(db_err))
                // MySQL error code 1146: Table doesn't exist, 1049: Unknown database
                if db_err.code().as_deref() == Some("1146")
                    || db_err.code().as_deref() == Some("1049") =>
            {
                log_info!(
                    "state table {}.{} does not exist, no state recorded yet",
                    self.schema,
                    self.table
                );
                return Ok(None);
            }
            Err(e) => {
                return Err(e).context(format!(
                    "failed to query global event state for cluster: {}",
                    self.cluster_name
                ))
            }
        };

        let row = match row {
            Some(row) => row,
            None => {
                log_info!(
                    "no global event state found for cluster: {}",
                    self.cluster_name
                );
                return Ok(None);
            }
        };

        let event_type: String = row.try_get("event_type")?;
        let position: String = row.try_get("position")?;
        let is_clean_shutdown: bool = row.try_get("is_clean_shutdown")?;
        Ok(Some(PersistedStreamState {
            event_type: EventType::from_str(&event_type)
                .with_context(|| format!("invalid event_type in state table: {}", event_type))?,
            position: serde_json::from_str::<Position>(&position)
                .with_context(|| format!("invalid position in state table: {}", position))?,
            is_clean_shutdown,
        }))
    }
}
