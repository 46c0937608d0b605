use dockerize_core::{ErrorKind, NpmrcSource, find_up};
use dockerize_tools::{NpmClient, NpmError, ToolExecutor};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::staging::PACKAGE_DIR;

pub const LOCKFILE: &str = "package-lock.json";
pub const NPMRC: &str = ".npmrc";

/// Pack the package with npm and unpack the archive into `staging_dir`.
///
/// The archive is deleted whether or not extraction succeeds. Returns the
/// extracted `package/` directory.
pub async fn pack_and_extract<E: ToolExecutor>(
    npm: &NpmClient<E>,
    package_root: &Path,
    staging_dir: &Path,
) -> Result<PathBuf, PackError> {
    let archive = npm.pack(package_root, staging_dir).await?;

    let extracted = extract(archive.clone(), staging_dir.to_path_buf()).await;
    let removed = tokio::fs::remove_file(&archive)
        .await
        .map_err(|e| PackError::RemoveArchive {
            path: archive.clone(),
            source: e,
        });

    extracted?;
    removed?;

    let package_dir = staging_dir.join(PACKAGE_DIR);
    tracing::debug!(path = %package_dir.display(), "package extracted");
    Ok(package_dir)
}

async fn extract(archive: PathBuf, dest: PathBuf) -> Result<(), PackError> {
    tokio::task::spawn_blocking(move || {
        let unpacked = File::open(&archive).and_then(|file| {
            tar::Archive::new(flate2::read::GzDecoder::new(file)).unpack(&dest)
        });
        unpacked.map_err(|e| PackError::Extract {
            archive,
            dest,
            source: e,
        })
    })
    .await
    .map_err(|e| PackError::Join {
        source: std::io::Error::other(e),
    })?
}

/// Copy `package-lock.json` from the package root into `dest_dir`.
///
/// Returns `false` when the package has no lockfile.
pub async fn copy_lockfile(package_root: &Path, dest_dir: &Path) -> Result<bool, PackError> {
    let lockfile = package_root.join(LOCKFILE);
    if !exists(&lockfile).await? {
        tracing::debug!(path = %lockfile.display(), "no lockfile");
        return Ok(false);
    }

    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| PackError::CreateDir {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;
    copy(&lockfile, &dest_dir.join(LOCKFILE)).await?;
    Ok(true)
}

/// Copy the requested `.npmrc` to `<staging_dir>/.npmrc`.
///
/// An explicit path must exist. [`NpmrcSource::Nearest`] searches upward
/// from `cwd` and is a no-op when nothing is found. Returns whether a file
/// was copied.
pub async fn copy_npmrc(
    source: Option<&NpmrcSource>,
    cwd: &Path,
    staging_dir: &Path,
) -> Result<bool, PackError> {
    let from = match source {
        None => return Ok(false),
        Some(NpmrcSource::Path(path)) => {
            let path = absolute(path)?;
            if !exists(&path).await? {
                return Err(PackError::NpmrcNotFound(path));
            }
            path
        }
        Some(NpmrcSource::Nearest) => match find_up(&absolute(cwd)?, NPMRC) {
            Some(found) => found,
            None => {
                tracing::debug!(cwd = %cwd.display(), "no .npmrc found");
                return Ok(false);
            }
        },
    };

    copy(&from, &staging_dir.join(NPMRC)).await?;
    tracing::debug!(path = %from.display(), ".npmrc staged");
    Ok(true)
}

async fn copy(from: &Path, to: &Path) -> Result<(), PackError> {
    tokio::fs::copy(from, to)
        .await
        .map(drop)
        .map_err(|e| PackError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e,
        })
}

async fn exists(path: &Path) -> Result<bool, PackError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| PackError::Stat {
            path: path.to_path_buf(),
            source: e,
        })
}

fn absolute(path: &Path) -> Result<PathBuf, PackError> {
    std::path::absolute(path).map_err(|e| PackError::Stat {
        path: path.to_path_buf(),
        source: e,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error(transparent)]
    Npm(#[from] NpmError),

    #[error("failed to extract {archive} into {dest}")]
    Extract {
        archive: PathBuf,
        dest: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove package archive {path}")]
    RemoveArchive {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("extraction task failed")]
    Join { source: std::io::Error },

    #[error(".npmrc file not found: {0}")]
    NpmrcNotFound(PathBuf),

    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to copy {from} to {to}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to check {path}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Npm(e) => e.kind(),
            Self::NpmrcNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Io,
        }
    }
}
