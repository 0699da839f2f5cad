use async_trait::async_trait;

use rh_common::meta::schema_snapshot::SchemaDump;

pub mod file_dump_handler;

/// Capability check only, a reported dump may still be stale.
#[async_trait]
pub trait DumpAvailabilityChecker {
    async fn dump_exists(&self) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait DumpHandler {
    async fn load_dump(&self) -> anyhow::Result<Option<SchemaDump>>;

    async fn create_dump(&self, dump: &SchemaDump) -> anyhow::Result<()>;

    async fn delete_dump(&self) -> anyhow::Result<()>;
}
