use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification shared by every dockerize error type.
///
/// Callers branch on this instead of matching each crate's variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed option, or a computed tag outside the image-name grammar.
    Validation,
    /// A required file (package.json, custom Dockerfile, .npmrc) is missing.
    NotFound,
    /// An external process (`npm`, `docker`) or lookup failed.
    ExternalTool,
    /// `docker push` failed after a successful build.
    Push,
    /// Filesystem failure while staging, copying, or writing.
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Options ──
    #[error("options must be an object, got {actual}")]
    OptionsNotObject { actual: String },

    #[error("expected option `{field}` to be {expected}, got {actual}")]
    InvalidOption {
        field: &'static str,
        expected: &'static str,
        actual: String,
    },

    // ── package.json ──
    #[error("unable to find a \"package.json\" for the package at {dir}")]
    PackageNotFound { dir: PathBuf },

    #[error("failed to resolve directory {path}")]
    DirResolve {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}")]
    PackageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    PackageParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{path} is missing the \"{field}\" field")]
    MissingPackageField { path: PathBuf, field: &'static str },

    #[error("package '{package}' contains no \"main\" or \"bin\" fields")]
    NoEntryPoint { package: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OptionsNotObject { .. }
            | Self::InvalidOption { .. }
            | Self::ConfigParse { .. }
            | Self::PackageParse { .. }
            | Self::MissingPackageField { .. } => ErrorKind::Validation,
            Self::PackageNotFound { .. } | Self::NoEntryPoint { .. } => ErrorKind::NotFound,
            Self::ConfigLoad { .. } | Self::DirResolve { .. } | Self::PackageRead { .. } => {
                ErrorKind::Io
            }
        }
    }
}
