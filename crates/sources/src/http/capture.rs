//! Request body capture
//!
//! Writes each inbound body to `<directory>/<timestamp>_request.txt` so
//! templates can be debugged against real payloads.

use std::path::{Path, PathBuf};

use chrono::Utc;

/// Writes request bodies to a directory
#[derive(Debug, Clone)]
pub struct BodyCapture {
    directory: PathBuf,
}

impl BodyCapture {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write `body` to a new capture file, returning its path
    pub async fn write(&self, body: &[u8]) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(file_name());
        tokio::fs::write(&path, body).await?;
        Ok(path)
    }
}

/// Nanosecond timestamp keeps concurrent captures apart
fn file_name() -> String {
    format!("{}_request.txt", Utc::now().format("%Y%m%dT%H%M%S%.9fZ"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_writes_body() {
        let dir = tempfile::tempdir().unwrap();
        let capture = BodyCapture::new(dir.path().join("nested"));

        let path = capture.write(b"{\"a\":1}").await.unwrap();

        assert!(path.starts_with(capture.directory()));
        assert!(path.to_string_lossy().ends_with("_request.txt"));
        assert_eq!(std::fs::read(&path).unwrap(), b"{\"a\":1}");
    }
}
