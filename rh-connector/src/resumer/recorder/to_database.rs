use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{query, MySql, Pool};

use crate::resumer::{recorder::StateRecorder, utils::ResumerUtil};
use rh_common::{log_info, meta::global_event_state::PersistedStreamState};

pub struct DatabaseStateRecorder {
    cluster_name: String,
    pool: Pool<MySql>,
    schema: String,
    table: String,
}

impl DatabaseStateRecorder {
    pub async fn new(
        cluster_name: &str,
        table_full_name: &str,
        pool: Pool<MySql>,
    ) -> anyhow::Result<Self> {
        let (schema, table) = ResumerUtil::get_full_table_name(table_full_name)?;
        let recorder = Self {
            cluster_name: cluster_name.to_string(),
            pool,
            schema,
            table,
        };
        recorder.initialization().await?;
        Ok(recorder)
    }

    async fn initialization(&self) -> Result<()> {
        log_info!(
            "DatabaseStateRecorder initialized, cluster_name: {}, schema: {}, table: {}",
            self.cluster_name,
            self.schema,
            self.table
        );
        let db_sql = format!("CREATE DATABASE IF NOT EXISTS `{}`", self.schema);
        let tb_sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS `{}`.`{}` (
              cluster_name varchar(255) NOT NULL PRIMARY KEY,
              event_type varchar(32) NOT NULL,
              position text NOT NULL,
              is_clean_shutdown tinyint(1) NOT NULL DEFAULT 0,
              updated_at timestamp DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            )"#,
            self.schema, self.table
        );
        query(&db_sql)
            .execute(&self.pool)
            .await
            .context(format!("failed to create database: {}", db_sql))?;
        query(&tb_sql)
            .execute(&self.pool)
            .await
            .context(format!("failed to create table: {}", tb_sql))?;
        Ok(())
    }
}

#[async_trait]
impl StateRecorder for DatabaseStateRecorder {
    async fn record(&self, state: &PersistedStreamState) -> Result<()> {
        let sql = format!(
            "INSERT INTO `{}`.`{}` (cluster_name, event_type, position, is_clean_shutdown)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                event_type = VALUES(event_type),
                position = VALUES(position),
                is_clean_shutdown = VALUES(is_clean_shutdown),
                updated_at = CURRENT_TIMESTAMP",
            self.schema, self.table
        );

        query(&sql)
            .bind(&self.cluster_name)
            .bind(state.event_type.to_string())
            .bind(state.position.to_string())
            .bind(state.is_clean_shutdown)
            .execute(&self.pool)
            .await
            .context("failed to upsert global event state")?;
        Ok(())
    }
}
