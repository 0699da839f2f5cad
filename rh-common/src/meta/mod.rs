pub mod binlog_event;
pub mod global_event_state;
pub mod gtid_set;
pub mod position;
pub mod schema_snapshot;
