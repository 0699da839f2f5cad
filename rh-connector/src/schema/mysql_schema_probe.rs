use std::collections::BTreeMap;

use anyhow::Context;
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{query, MySql, Pool, Row};

use super::SchemaProbe;
use rh_common::{meta::schema_snapshot::SchemaSnapshot, system_dbs::SystemDb};

pub struct MysqlSchemaProbe {
    conn_pool: Pool<MySql>,
    // empty means every non-system db
    dbs: Vec<String>,
}

impl MysqlSchemaProbe {
    pub fn new(conn_pool: Pool<MySql>, dbs: Vec<String>) -> Self {
        Self { conn_pool, dbs }
    }

    fn build_sql(&self) -> String {
        let (filter, count) = if self.dbs.is_empty() {
            ("NOT IN", SystemDb::get_system_dbs().len())
        } else {
            ("IN", self.dbs.len())
        };
        let placeholders = vec!["?"; count].join(",");
        format!(
            "SELECT CAST(TABLE_SCHEMA AS CHAR) AS table_schema,
                CAST(TABLE_NAME AS CHAR) AS table_name,
                CAST(COLUMN_NAME AS CHAR) AS column_name,
                CAST(COLUMN_TYPE AS CHAR) AS column_type
            FROM information_schema.columns
            WHERE TABLE_SCHEMA {} ({})
            ORDER BY TABLE_SCHEMA, TABLE_NAME, ORDINAL_POSITION",
            filter, placeholders
        )
    }
}

#[async_trait]
impl SchemaProbe for MysqlSchemaProbe {
    async fn probe(&self) -> anyhow::Result<SchemaSnapshot> {
        let sql = self.build_sql();
        let mut sqlx_query = query(&sql);
        if self.dbs.is_empty() {
            for db in SystemDb::get_system_dbs() {
                sqlx_query = sqlx_query.bind(db);
            }
        } else {
            for db in self.dbs.iter() {
                sqlx_query = sqlx_query.bind(db);
            }
        }

        let mut columns: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut rows = sqlx_query.fetch(&self.conn_pool);
        while let Some(row) = rows
            .try_next()
            .await
            .context("failed to probe live schema")?
        {
            let schema: String = row.try_get("table_schema")?;
            let tb: String = row.try_get("table_name")?;
            let column_name: String = row.try_get("column_name")?;
            let column_type: String = row.try_get("column_type")?;
            columns
                .entry(SchemaSnapshot::table_key(&schema, &tb))
                .or_default()
                .push(format!("{} {}", column_name, column_type));
        }

        Ok(SchemaSnapshot {
            tables: columns
                .into_iter()
                .map(|(key, cols)| (key, cols.join(", ")))
                .collect(),
        })
    }
}
