use dockerize_core::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix for staging directories created under the system temp dir.
pub const STAGING_PREFIX: &str = "dockerize-";

/// Subdirectory `npm pack` extracts into.
pub const PACKAGE_DIR: &str = "package";

/// Temporary build context handed to `docker build`.
///
/// ```text
/// <staging>/
///   Dockerfile
///   .npmrc                 (optional)
///   package/               (npm pack output)
///     package-lock.json    (optional)
/// ```
///
/// The directory is removed by [`StagingArea::release`], or on drop if the
/// pipeline bails out before reaching it.
#[derive(Debug)]
pub struct StagingArea {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl StagingArea {
    /// Create a fresh staging directory under the system temp dir.
    pub fn acquire() -> Result<Self, StagingError> {
        Self::acquire_in(&std::env::temp_dir())
    }

    /// Create a fresh staging directory under `parent`.
    pub fn acquire_in(parent: &Path) -> Result<Self, StagingError> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| StagingError::Create {
                parent: parent.to_path_buf(),
                source: e,
            })?;
        let path = dir.path().to_path_buf();

        tracing::debug!(path = %path.display(), "staging area acquired");
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dockerfile_path(&self) -> PathBuf {
        self.path.join("Dockerfile")
    }

    pub fn package_dir(&self) -> PathBuf {
        self.path.join(PACKAGE_DIR)
    }

    pub fn is_released(&self) -> bool {
        self.dir.is_none()
    }

    /// Remove the staging directory and everything in it.
    ///
    /// Calling this more than once is a no-op, as is releasing a directory
    /// something else already deleted.
    pub async fn release(&mut self) -> Result<(), StagingError> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };

        let path = self.path.clone();
        let removed = tokio::task::spawn_blocking(move || dir.close())
            .await
            .map_err(std::io::Error::other)
            .and_then(|result| result);

        match removed {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "staging area released");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StagingError::Remove { path, source: e }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("failed to create staging directory in {parent}")]
    Create {
        parent: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove staging directory {path}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StagingError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Io
    }
}
