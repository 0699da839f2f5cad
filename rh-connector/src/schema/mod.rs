use async_trait::async_trait;

use rh_common::meta::schema_snapshot::SchemaSnapshot;

pub mod file_schema_cache;
pub mod mysql_schema_probe;

/// The locally cached schema the tailer interprets row events with.
#[async_trait]
pub trait SchemaCache {
    async fn snapshot(&self) -> anyhow::Result<SchemaSnapshot>;

    async fn replace(&self, snapshot: &SchemaSnapshot) -> anyhow::Result<()>;
}

/// Reads the schema currently in effect on the source.
#[async_trait]
pub trait SchemaProbe {
    async fn probe(&self) -> anyhow::Result<SchemaSnapshot>;
}
