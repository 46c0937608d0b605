use std::process::Stdio;

use crate::error::{STDERR_TAIL_LINES, ToolError, tail_lines};

/// Abstraction over CLI process execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ToolExecutor: Send + Sync {
    /// Execute a command and capture stdout. Stderr is kept only for errors.
    async fn exec(&self, args: &[String]) -> Result<String, ToolError>;

    /// Execute a command, streaming output to the terminal.
    async fn exec_streaming(&self, args: &[String]) -> Result<(), ToolError>;
}

/// Real executor for a single program (`docker`, `npm`).
#[derive(Debug, Clone)]
pub struct RealExecutor {
    program: String,
}

impl RealExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ToolExecutor for RealExecutor {
    async fn exec(&self, args: &[String]) -> Result<String, ToolError> {
        tracing::trace!(program = %self.program, ?args, "exec");

        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ToolError::spawn(&self.program, e))?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ToolError::InvalidUtf8 {
                program: self.program.clone(),
                source: e,
            })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ToolError::CommandFailed {
                program: self.program.clone(),
                args: args.to_vec(),
                status: output.status.to_string(),
                stderr: tail_lines(&stderr, STDERR_TAIL_LINES),
            })
        }
    }

    async fn exec_streaming(&self, args: &[String]) -> Result<(), ToolError> {
        tracing::trace!(program = %self.program, ?args, "exec (streaming)");

        let status = tokio::process::Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ToolError::spawn(&self.program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::CommandFailed {
                program: self.program.clone(),
                args: args.to_vec(),
                status: status.to_string(),
                stderr: String::new(),
            })
        }
    }
}
