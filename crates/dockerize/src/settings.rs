use std::path::PathBuf;

/// How much a run reports. Ordered from least to most output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    Quiet,
    #[default]
    Normal,
    Verbose,
    /// Also streams `docker` output to the terminal.
    Trace,
}

impl Verbosity {
    /// `-q` wins over any number of `-v`.
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Parse a `LOG_LEVEL` value. Accepts npm-style names (`silly`,
    /// `verbose`, `http`) as well as tracing level names.
    pub fn from_log_level(level: &str) -> Option<Self> {
        match level.trim().to_ascii_lowercase().as_str() {
            "silent" | "off" => Some(Self::Silent),
            "error" | "warn" => Some(Self::Quiet),
            "info" | "http" => Some(Self::Normal),
            "verbose" | "debug" => Some(Self::Verbose),
            "silly" | "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// `EnvFilter` directive: dependencies stay at `warn`, dockerize crates
    /// follow the verbosity.
    pub fn filter_directive(self) -> String {
        let level = match self {
            Self::Silent => return "off".to_owned(),
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::Trace => "trace",
        };
        format!("warn,dockerize={level}")
    }

    pub fn streams_tool_output(self) -> bool {
        self >= Self::Trace
    }

    pub fn shows_error_chain(self) -> bool {
        self >= Self::Verbose
    }
}

/// Per-run settings handed to the [`Dockerizer`](crate::Dockerizer).
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub verbosity: Verbosity,
    /// Parent directory for staging areas. System temp dir when unset.
    pub staging_root: Option<PathBuf>,
}

impl Settings {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            staging_root: None,
        }
    }
}
