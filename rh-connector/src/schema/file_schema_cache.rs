use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;

use super::SchemaCache;
use rh_common::{
    log_info, meta::schema_snapshot::SchemaSnapshot, utils::file_util::FileUtil,
};

pub struct FileSchemaCache {
    cache_file: String,
}

impl FileSchemaCache {
    pub fn new(cache_file: &str) -> Self {
        Self {
            cache_file: cache_file.to_string(),
        }
    }
}

#[async_trait]
impl SchemaCache for FileSchemaCache {
    async fn snapshot(&self) -> anyhow::Result<SchemaSnapshot> {
        // a missing cache is an empty schema, recovery decides whether that is acceptable
        if !FileUtil::exists(&self.cache_file).await {
            return Ok(SchemaSnapshot::default());
        }
        let content = fs::read_to_string(&self.cache_file)
            .await
            .with_context(|| format!("failed to read schema cache: [{}]", self.cache_file))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid schema cache: [{}]", self.cache_file))
    }

    async fn replace(&self, snapshot: &SchemaSnapshot) -> anyhow::Result<()> {
        let content = serde_json::to_string(snapshot)?;
        FileUtil::write_atomic(&self.cache_file, &content).await?;
        log_info!(
            "schema cache [{}] replaced, version: {}",
            self.cache_file,
            snapshot.fingerprint()
        );
        Ok(())
    }
}
