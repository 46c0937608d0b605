use dockerize_core::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{ToolError, stderr_suffix};
use crate::executor::{RealExecutor, ToolExecutor};

/// npm operations client, parameterized over the executor for testability.
pub struct NpmClient<E: ToolExecutor = RealExecutor> {
    executor: E,
}

impl NpmClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor::new("npm"),
        }
    }
}

impl Default for NpmClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ToolExecutor> NpmClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// `npm pack <package_root> --pack-destination <destination>`
    ///
    /// Produces the same file set `npm publish` would ship. npm prints the
    /// archive name as the last line of stdout; the returned path points at
    /// it inside `destination`.
    pub async fn pack(&self, package_root: &Path, destination: &Path) -> Result<PathBuf, NpmError> {
        let root = package_root
            .to_str()
            .ok_or_else(|| NpmError::InvalidPath(package_root.to_path_buf()))?;
        let dest = destination
            .to_str()
            .ok_or_else(|| NpmError::InvalidPath(destination.to_path_buf()))?;

        let output = self
            .executor
            .exec(&[
                "pack".to_owned(),
                root.to_owned(),
                "--pack-destination".to_owned(),
                dest.to_owned(),
            ])
            .await
            .map_err(|e| NpmError::Pack { source: e })?;

        let archive_name = output
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .ok_or_else(|| NpmError::NoArchive {
                output: output.clone(),
            })?;

        tracing::debug!(archive = archive_name, "npm pack finished");
        Ok(destination.join(archive_name))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NpmError {
    #[error("path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("npm pack failed{}", stderr_suffix(.source))]
    Pack { source: ToolError },

    #[error("npm pack did not report an archive name (output: {output:?})")]
    NoArchive { output: String },
}

impl NpmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPath(_) => ErrorKind::Io,
            Self::Pack { .. } | Self::NoArchive { .. } => ErrorKind::ExternalTool,
        }
    }
}
