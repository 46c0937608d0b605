use dockerize_core::ErrorKind;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and written into staging.
pub const DOCKERFILE: &str = "Dockerfile";

const TEMPLATE: &str = include_str!("../templates/Dockerfile.tera");

/// Inputs to the built-in Dockerfile template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateData {
    pub entry: String,
    pub env_vars: Vec<String>,
    pub has_lockfile: bool,
    pub node_version: String,
    pub ubuntu_version: String,
    pub tini_version: String,
    pub has_npmrc: bool,
}

/// Where the build's Dockerfile comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerfileSource {
    /// Explicit `--dockerfile` path.
    Custom(PathBuf),
    /// `Dockerfile` found in the working directory.
    Context(PathBuf),
    /// Rendered from the built-in template.
    Generated(TemplateData),
}

impl DockerfileSource {
    pub fn kind(&self) -> DockerfileKind {
        match self {
            Self::Custom(_) => DockerfileKind::Custom,
            Self::Context(_) => DockerfileKind::Context,
            Self::Generated(_) => DockerfileKind::Generated,
        }
    }

    /// The file copied into staging, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Custom(path) | Self::Context(path) => Some(path),
            Self::Generated(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockerfileKind {
    Custom,
    Context,
    Generated,
}

impl fmt::Display for DockerfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Custom => "custom",
            Self::Context => "context",
            Self::Generated => "generated",
        })
    }
}

/// Pick the Dockerfile for this build. First match wins:
///
/// 1. `custom`, resolved against the process working directory. It must
///    exist; a missing custom file is an error, never a fallthrough.
/// 2. `<context_dir>/Dockerfile`, if present.
/// 3. The built-in template rendered with `data`.
pub async fn resolve(
    custom: Option<&Path>,
    context_dir: &Path,
    data: TemplateData,
) -> Result<DockerfileSource, DockerfileError> {
    if let Some(custom) = custom {
        let path = std::path::absolute(custom).map_err(|e| DockerfileError::Stat {
            path: custom.to_path_buf(),
            source: e,
        })?;
        return if exists(&path).await? {
            Ok(DockerfileSource::Custom(path))
        } else {
            Err(DockerfileError::CustomNotFound(path))
        };
    }

    let context = context_dir.join(DOCKERFILE);
    if exists(&context).await? {
        return Ok(DockerfileSource::Context(context));
    }

    Ok(DockerfileSource::Generated(data))
}

/// Write the chosen Dockerfile to `dest`: a copy for file sources, a render
/// for the template.
pub async fn materialize(source: &DockerfileSource, dest: &Path) -> Result<(), DockerfileError> {
    match source {
        DockerfileSource::Custom(path) | DockerfileSource::Context(path) => {
            tokio::fs::copy(path, dest)
                .await
                .map_err(|e| DockerfileError::Copy {
                    from: path.clone(),
                    to: dest.to_path_buf(),
                    source: e,
                })?;
        }
        DockerfileSource::Generated(data) => {
            let content = DockerfileGenerator::new(data).render()?;
            tokio::fs::write(dest, content)
                .await
                .map_err(|e| DockerfileError::Write {
                    path: dest.to_path_buf(),
                    source: e,
                })?;
        }
    }

    tracing::debug!(source = %source.kind(), path = %dest.display(), "Dockerfile written");
    Ok(())
}

async fn exists(path: &Path) -> Result<bool, DockerfileError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| DockerfileError::Stat {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Renders the built-in Ubuntu + Node + tini Dockerfile.
pub struct DockerfileGenerator<'a> {
    data: &'a TemplateData,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(data: &'a TemplateData) -> Self {
        Self { data }
    }

    pub fn render(&self) -> Result<String, DockerfileError> {
        let context = tera::Context::from_serialize(self.data)
            .map_err(|e| DockerfileError::Render { source: e })?;
        tera::Tera::one_off(TEMPLATE, &context, false)
            .map_err(|e| DockerfileError::Render { source: e })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DockerfileError {
    #[error("custom Dockerfile not found: {0}")]
    CustomNotFound(PathBuf),

    #[error("failed to check {path}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to copy Dockerfile from {from} to {to}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write Dockerfile at {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to render Dockerfile template")]
    Render { source: tera::Error },
}

impl DockerfileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CustomNotFound(_) => ErrorKind::NotFound,
            Self::Render { .. } => ErrorKind::Validation,
            Self::Stat { .. } | Self::Copy { .. } | Self::Write { .. } => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> TemplateData {
        TemplateData {
            entry: "dist/server.js".to_owned(),
            env_vars: vec![],
            has_lockfile: false,
            node_version: "22.11.0".to_owned(),
            ubuntu_version: "20.10".to_owned(),
            tini_version: "0.19.0".to_owned(),
            has_npmrc: false,
        }
    }

    fn render(data: &TemplateData) -> String {
        DockerfileGenerator::new(data).render().unwrap()
    }

    #[test]
    fn dockerfile_uses_ubuntu_base() {
        assert!(render(&data()).starts_with("FROM ubuntu:20.10\n"));
    }

    #[test]
    fn dockerfile_installs_node_and_tini_versions() {
        let output = render(&data());
        assert!(output.contains("ARG NODE_VERSION=22.11.0"));
        assert!(output.contains("ARG TINI_VERSION=0.19.0"));
        assert!(output.contains("node-v${NODE_VERSION}-linux-x64.tar.xz"));
    }

    #[test]
    fn dockerfile_entrypoint_runs_entry_under_tini() {
        let output = render(&data());
        assert!(output.contains(r#"ENTRYPOINT ["/tini", "--", "node", "dist/server.js"]"#));
    }

    #[test]
    fn dockerfile_npm_install_without_lockfile() {
        let output = render(&data());
        assert!(output.contains("RUN npm install --production"));
        assert!(!output.contains("npm ci"));
    }

    #[test]
    fn dockerfile_npm_ci_with_lockfile() {
        let output = render(&TemplateData {
            has_lockfile: true,
            ..data()
        });
        assert!(output.contains("RUN npm ci --production"));
    }

    #[test]
    fn dockerfile_npmrc_copied_then_removed() {
        let output = render(&TemplateData {
            has_npmrc: true,
            ..data()
        });
        assert!(output.contains("COPY .npmrc /root/.npmrc"));
        assert!(output.contains("rm -f /root/.npmrc"));
    }

    #[test]
    fn dockerfile_no_npmrc_by_default() {
        assert!(!render(&data()).contains(".npmrc"));
    }

    #[test]
    fn dockerfile_env_lines() {
        let output = render(&TemplateData {
            env_vars: vec!["NODE_ENV=production".to_owned(), "PORT=8080".to_owned()],
            ..data()
        });
        assert!(output.contains("ENV NODE_ENV=production\n"));
        assert!(output.contains("ENV PORT=8080\n"));
    }

    #[test]
    fn dockerfile_no_env_when_empty() {
        assert!(!render(&data()).contains("ENV "));
    }

    #[test]
    fn kind_display() {
        assert_eq!(DockerfileKind::Custom.to_string(), "custom");
        assert_eq!(DockerfileKind::Context.to_string(), "context");
        assert_eq!(DockerfileKind::Generated.to_string(), "generated");
    }
}
