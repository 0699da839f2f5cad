use std::path::Path;

use anyhow::Context;
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt, AsyncSeekExt, SeekFrom},
};

const TAIL_CHUNK_SIZE: u64 = 4096;

pub struct FileUtil {}

impl FileUtil {
    pub async fn exists(path: &str) -> bool {
        fs::metadata(path).await.is_ok()
    }

    /// Returns the last `n` non-empty lines of the file, oldest first.
    pub async fn tail(path: &str, n: usize) -> anyhow::Result<Vec<String>> {
        let mut file = File::open(path)
            .await
            .with_context(|| format!("failed to open file: [{}]", path))?;
        let file_len = file.seek(SeekFrom::End(0)).await?;

        // read chunks backwards until enough line breaks are collected
        let mut offset = file_len;
        let mut buf: Vec<u8> = Vec::new();
        while offset > 0 && count_newlines(&buf) <= n {
            let chunk_size = TAIL_CHUNK_SIZE.min(offset);
            offset -= chunk_size;
            file.seek(SeekFrom::Start(offset)).await?;
            let mut chunk = vec![0u8; chunk_size as usize];
            file.read_exact(&mut chunk).await?;
            chunk.extend_from_slice(&buf);
            buf = chunk;
        }

        let content = String::from_utf8_lossy(&buf);
        let lines: Vec<String> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.to_string())
            .collect();
        let skip = lines.len().saturating_sub(n);
        Ok(lines.into_iter().skip(skip).collect())
    }

    /// Writes through a temp file and a rename, so readers never see a half written file.
    pub async fn write_atomic(path: &str, content: &str) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create dir: [{}]", parent.display()))?;
            }
        }
        let tmp_path = format!("{}.tmp", path);
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("failed to write file: [{}]", tmp_path))?;
        fs::rename(&tmp_path, path)
            .await
            .with_context(|| format!("failed to rename [{}] to [{}]", tmp_path, path))?;
        Ok(())
    }
}

fn count_newlines(buf: &[u8]) -> usize {
    buf.iter().filter(|b| **b == b'\n').count()
}
