use dockerize_build::{DockerfileError, NodeVersionError, PackError, PlanError, StagingError};
use dockerize_core::ErrorKind;
use dockerize_tools::{DockerError, PushError};

pub type Result<T> = std::result::Result<T, Error>;

/// Any failure of a dockerize run. Use [`Error::kind`] to branch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] dockerize_core::Error),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    NodeVersion(#[from] NodeVersionError),

    #[error(transparent)]
    Dockerfile(#[from] DockerfileError),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error(transparent)]
    Docker(#[from] DockerError),

    #[error(transparent)]
    Push(#[from] PushError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Core(e) => e.kind(),
            Self::Plan(e) => e.kind(),
            Self::Staging(e) => e.kind(),
            Self::NodeVersion(e) => e.kind(),
            Self::Dockerfile(e) => e.kind(),
            Self::Pack(e) => e.kind(),
            Self::Docker(e) => e.kind(),
            Self::Push(e) => e.kind(),
        }
    }
}
