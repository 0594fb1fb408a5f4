use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::errors::AppResult;

/// Which artifacts made it to disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactReport {
    pub json_written: bool,
    pub m3u_written: bool,
}

/// Write an artifact atomically, creating parent directories as needed
pub async fn write_artifact(path: &Path, contents: &str) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    tokio::fs::write(&temp_path, contents).await?;
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Write one artifact, logging instead of failing
pub(crate) async fn write_logged(label: &str, path: &Path, contents: &str) -> bool {
    match write_artifact(path, contents).await {
        Ok(()) => {
            info!("{} written: {:?}", label, path);
            true
        }
        Err(e) => {
            error!("Failed to write {} {:?}: {}", label, path, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_creates_parent_and_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("playlist.m3u");

        write_artifact(&path, "first").await.unwrap();
        write_artifact(&path, "second").await.unwrap();

        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "second");
        assert!(!dir.path().join("out").join("playlist.m3u.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_logged_reports_failure() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be replaced by a file
        let target = dir.path().join("taken");
        tokio::fs::create_dir_all(target.join("child")).await.unwrap();

        assert!(!write_logged("M3U playlist", &target, "data").await);
        assert!(write_logged("M3U playlist", &dir.path().join("ok.m3u"), "data").await);
    }
}
