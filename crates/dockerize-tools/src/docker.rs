use dockerize_core::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{ToolError, stderr_suffix};
use crate::executor::{RealExecutor, ToolExecutor};

/// Docker operations client, parameterized over the executor for testability.
pub struct DockerClient<E: ToolExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor::new("docker"),
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ToolExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Preflight ──

    /// Verify the docker CLI is installed and the daemon answers.
    /// Returns the server version.
    pub async fn server_version(&self) -> Result<String, DockerError> {
        let version = self
            .executor
            .exec(&args(["version", "--format", "{{.Server.Version}}"]))
            .await
            .map_err(|e| DockerError::Unavailable { source: e })?;

        Ok(version.trim().to_owned())
    }

    // ── Build ──

    /// `docker build <context> <flags...>`
    ///
    /// `stream`: when `true`, build output goes straight to the terminal;
    /// otherwise it is captured and only stderr is kept for the error.
    pub async fn build(
        &self,
        context: &Path,
        flags: &[String],
        stream: bool,
    ) -> Result<(), DockerError> {
        let context_str = context
            .to_str()
            .ok_or_else(|| DockerError::InvalidPath(context.to_path_buf()))?;

        let mut cmd = args(["build", context_str]);
        cmd.extend(flags.iter().cloned());

        let result = if stream {
            self.executor.exec_streaming(&cmd).await
        } else {
            self.executor.exec(&cmd).await.map(drop)
        };

        result.map_err(|e| DockerError::Build { source: e })
    }

    // ── Inspect ──

    /// Size in bytes of a local image.
    pub async fn image_size(&self, tag: &str) -> Result<u64, DockerError> {
        let output = self
            .executor
            .exec(&args(["image", "inspect", "--format", "{{.Size}}", tag]))
            .await
            .map_err(|e| DockerError::Inspect {
                tag: tag.to_owned(),
                source: e,
            })?;

        output
            .trim()
            .parse::<u64>()
            .map_err(|e| DockerError::InvalidSize {
                tag: tag.to_owned(),
                output: output.trim().to_owned(),
                source: e,
            })
    }

    // ── Push ──

    pub async fn push(&self, tag: &str, stream: bool) -> Result<(), PushError> {
        let cmd = args(["push", tag]);

        let result = if stream {
            self.executor.exec_streaming(&cmd).await
        } else {
            self.executor.exec(&cmd).await.map(drop)
        };

        result.map_err(|e| PushError {
            tag: tag.to_owned(),
            source: e,
        })
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

/// Formats size in bytes to human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2}GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes}B")
    }
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("docker is not available; install Docker and make sure the daemon is running")]
    Unavailable { source: ToolError },

    #[error("build context path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("docker build failed{}", stderr_suffix(.source))]
    Build { source: ToolError },

    #[error("failed to inspect image {tag}{}", stderr_suffix(.source))]
    Inspect { tag: String, source: ToolError },

    #[error("docker reported an unreadable size for {tag}: {output:?}")]
    InvalidSize {
        tag: String,
        output: String,
        source: std::num::ParseIntError,
    },
}

impl DockerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPath(_) => ErrorKind::Io,
            _ => ErrorKind::ExternalTool,
        }
    }
}

/// `docker push` failed. The image was built and still exists locally.
#[derive(Debug, thiserror::Error)]
#[error("docker push {tag} failed; the image is still available locally{}", stderr_suffix(.source))]
pub struct PushError {
    pub tag: String,
    pub source: ToolError,
}

impl PushError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Push
    }
}
