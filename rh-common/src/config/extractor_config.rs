use super::config_enums::DbType;

#[derive(Clone, Debug)]
pub struct ExtractorConfig {
    pub db_type: DbType,
    pub url: String,
    pub server_id: u64,
    pub gtid_enabled: bool,
    pub binlog_heartbeat_interval_secs: u64,
    pub binlog_timeout_secs: u64,
    pub max_connections: u32,
    // dbs whose schema is tracked, empty means all non-system dbs
    pub schema_dbs: Vec<String>,
}
