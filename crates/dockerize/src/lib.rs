//! Containerize an npm package with docker.
//!
//! This is the facade crate: it owns the pipeline and re-exports the pieces
//! callers need from the `dockerize-*` sub-crates.
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `dockerize-core` | option validation, `package.json` introspection, `dockerize.toml` |
//! | `dockerize-build` | staging area, Dockerfile resolution, build plan, packaging |
//! | `dockerize-tools` | `docker` and `npm` process clients |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use dockerize::{Dockerizer, Settings};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), dockerize::Error> {
//! let dockerizer = Dockerizer::new(Settings::default());
//! let result = dockerizer
//!     .dockerize(&json!({ "cwd": "./my-app", "labels": "team=web" }))
//!     .await?;
//! println!("built {} ({})", result.tag, result.formatted_size());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod pipeline;
pub mod report;
pub mod settings;

pub use dockerize_core::{
    BuildConfig, BuildRequest, DockerizeConfig, ErrorKind, ImageConfig, NEAREST_NPMRC,
    NpmrcSource, PackageDescriptor,
};
pub use error::{Error, Result};
pub use pipeline::Dockerizer;
pub use report::{BuildResult, format_duration};
pub use settings::{Settings, Verbosity};

/// Staging, Dockerfile resolution, build planning, and packaging.
pub mod build {
    pub use dockerize_build::*;
}

/// `docker` and `npm` process clients.
pub mod tools {
    pub use dockerize_tools::*;
}
