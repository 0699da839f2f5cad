use std::str::FromStr;

use anyhow::{bail, Context, Result};
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    MySql, Pool,
};

use crate::resumer::{DEFAULT_RESUMER_SCHEMA, DEFAULT_RESUMER_TABLE};

pub struct ResumerUtil {}

impl ResumerUtil {
    pub fn get_full_table_name(full_table_name: &str) -> Result<(String, String)> {
        if full_table_name.is_empty() {
            return Ok((
                DEFAULT_RESUMER_SCHEMA.to_string(),
                DEFAULT_RESUMER_TABLE.to_string(),
            ));
        }

        match full_table_name.split_once('.') {
            Some((schema, table))
                if !schema.is_empty() && !table.is_empty() && !table.contains('.') =>
            {
                Ok((schema.to_string(), table.to_string()))
            }
            _ => bail!("invalid full table name: {}", full_table_name),
        }
    }

    pub async fn create_pool(url: &str, max_connections: u32) -> Result<Pool<MySql>> {
        let conn_options =
            MySqlConnectOptions::from_str(url).context("failed to parse MySQL connection URL")?;
        MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(conn_options)
            .await
            .context("failed to create MySQL connection pool")
    }
}
