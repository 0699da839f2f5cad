use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;

use super::{DumpAvailabilityChecker, DumpHandler};
use rh_common::{
    log_info,
    meta::schema_snapshot::SchemaDump,
    utils::file_util::FileUtil,
};

const DUMP_FILE_SUFFIX: &str = "schema_dump.json";

/// Keeps one schema dump per cluster under `dump_dir`.
pub struct FileDumpHandler {
    dump_file: String,
}

impl FileDumpHandler {
    pub fn new(dump_dir: &str, cluster_name: &str) -> Self {
        Self {
            dump_file: format!(
                "{}/{}.{}",
                dump_dir.trim_end_matches('/'),
                cluster_name,
                DUMP_FILE_SUFFIX
            ),
        }
    }

    pub fn dump_file(&self) -> &str {
        &self.dump_file
    }
}

#[async_trait]
impl DumpAvailabilityChecker for FileDumpHandler {
    async fn dump_exists(&self) -> anyhow::Result<bool> {
        Ok(FileUtil::exists(&self.dump_file).await)
    }
}

#[async_trait]
impl DumpHandler for FileDumpHandler {
    async fn load_dump(&self) -> anyhow::Result<Option<SchemaDump>> {
        if !FileUtil::exists(&self.dump_file).await {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.dump_file)
            .await
            .with_context(|| format!("failed to read dump file: [{}]", self.dump_file))?;
        let dump = serde_json::from_str(&content)
            .with_context(|| format!("invalid dump file: [{}]", self.dump_file))?;
        Ok(Some(dump))
    }

    async fn create_dump(&self, dump: &SchemaDump) -> anyhow::Result<()> {
        let content = serde_json::to_string(dump)?;
        FileUtil::write_atomic(&self.dump_file, &content).await?;
        log_info!(
            "schema dump created: [{}], position: {}",
            self.dump_file,
            dump.position
        );
        Ok(())
    }

    async fn delete_dump(&self) -> anyhow::Result<()> {
        if FileUtil::exists(&self.dump_file).await {
            fs::remove_file(&self.dump_file)
                .await
                .with_context(|| format!("failed to delete dump file: [{}]", self.dump_file))?;
            log_info!("schema dump deleted: [{}]", self.dump_file);
        }
        Ok(())
    }
}
