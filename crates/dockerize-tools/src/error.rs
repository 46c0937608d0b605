/// Number of trailing stderr lines kept for diagnostics.
pub const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{program} not found; is it installed and on PATH?")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("failed to run {program}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} command failed ({status}): {args:?}")]
    CommandFailed {
        program: String,
        args: Vec<String>,
        status: String,
        /// Last [`STDERR_TAIL_LINES`] lines of the process's stderr.
        stderr: String,
    },

    #[error("{program} output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },
}

impl ToolError {
    pub(crate) fn spawn(program: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                program: program.to_owned(),
                source,
            }
        } else {
            Self::Spawn {
                program: program.to_owned(),
                source,
            }
        }
    }

    /// Captured stderr tail, when the process ran and failed.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}

/// Last `n` lines of `text`, trimmed.
pub fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// `":\n<stderr>"` for the wrapping error's message, or nothing.
pub(crate) fn stderr_suffix(err: &ToolError) -> String {
    match err.stderr() {
        Some(s) => format!(":\n{s}"),
        None => String::new(),
    }
}
