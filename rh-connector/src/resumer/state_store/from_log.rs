use anyhow::Context;
use async_trait::async_trait;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

use super::GlobalStateStore;
use crate::resumer::{GLOBAL_EVENT_STATE_LOG_FLAG, TAIL_POSITION_COUNT};
use rh_common::{
    log_warn, meta::global_event_state::PersistedStreamState, utils::file_util::FileUtil,
};

/// Reads state lines written by LogStateRecorder to `{log_dir}/position.log`.
/// A `config_file` with the same line format is the fallback when the log has none,
/// e.g. to hand a state over from another deployment.
pub struct LogStateStore {
    position_log_file: String,
    config_file: String,
}

impl LogStateStore {
    pub fn new(log_dir: &str, config_file: &str) -> Self {
        Self {
            position_log_file: if log_dir.is_empty() {
                String::new()
            } else {
                format!("{}/position.log", log_dir)
            },
            config_file: config_file.to_string(),
        }
    }

    fn parse_line(line: &str) -> Option<PersistedStreamState> {
        if !line.contains(GLOBAL_EVENT_STATE_LOG_FLAG) {
            return None;
        }
        PersistedStreamState::from_log(line)
    }

    async fn load_from_log(&self) -> anyhow::Result<Option<PersistedStreamState>> {
        if self.position_log_file.is_empty() || !FileUtil::exists(&self.position_log_file).await {
            return Ok(None);
        }
        let lines = FileUtil::tail(&self.position_log_file, TAIL_POSITION_COUNT).await?;
        Ok(lines.iter().rev().find_map(|line| Self::parse_line(line)))
    }

    async fn load_from_config_file(&self) -> anyhow::Result<Option<PersistedStreamState>> {
        if self.config_file.is_empty() {
            return Ok(None);
        }
        if !FileUtil::exists(&self.config_file).await {
            log_warn!("resume config file: [{}] does not exist", self.config_file);
            return Ok(None);
        }

        let file = File::open(&self.config_file).await.with_context(|| {
            format!(
                "failed to open resume config file: [{}] while it exists",
                self.config_file
            )
        })?;
        let mut state = None;
        let mut lines = BufReader::new(file).lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(parsed) = Self::parse_line(&line) {
                state = Some(parsed);
            }
        }
        Ok(state)
    }
}

#[async_trait]
impl GlobalStateStore for LogStateStore {
    async fn get(&self) -> anyhow::Result<Option<PersistedStreamState>> {
        if let Some(state) = self.load_from_log().await? {
            return Ok(Some(state));
        }
        self.load_from_config_file().await
    }
}
