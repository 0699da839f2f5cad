#[derive(Clone, Debug)]
pub enum ResumerConfig {
    FromLog {
        log_dir: String,
        config_file: String,
    },
    FromDB {
        url: String,
        // such as rh_metadata.global_event_state
        table_full_name: String,
        max_connections: u32,
    },
}
