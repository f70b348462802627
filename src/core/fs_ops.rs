// src/core/fs_ops.rs
//! File system helpers with consistent error context

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::info;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    pub async fn read_file_safe(path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Write file, creating its parent directory when needed
    pub async fn write_file_safe(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Self::ensure_dir_exists(parent).await?;
        }

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        info!("Written file: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("briefs").join("brief.md");

        FsOps::write_file_safe(&path, "# Brief").await.unwrap();

        assert_eq!(FsOps::read_file_safe(&path).await.unwrap(), "# Brief");
    }

    #[tokio::test]
    async fn test_read_missing_file_names_the_path() {
        let err = FsOps::read_file_safe(Path::new("/nonexistent/brief.toml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/brief.toml"));
    }
}
