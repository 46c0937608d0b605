//! Build context assembly for dockerize.
//!
//! # Staging layout
//!
//! ```text
//! /tmp/dockerize-XXXXXX/
//!   Dockerfile          ── custom, context, or rendered from the template
//!   .npmrc              ── optional, removed inside the image after install
//!   package/            ── `npm pack` output, the files `npm publish` ships
//!     package-lock.json ── optional, enables `npm ci`
//! ```
//!
//! # Dockerfile precedence
//!
//! 1. `--dockerfile <path>` (must exist)
//! 2. `Dockerfile` in the working directory
//! 3. Generated: Ubuntu base, Node.js linux-x64 tarball, tini as init

pub mod dockerfile;
pub mod node;
pub mod packager;
pub mod plan;
pub mod staging;

pub use dockerfile::{DockerfileError, DockerfileGenerator, DockerfileKind, DockerfileSource, TemplateData};
pub use node::{NodeDistIndex, NodeVersionError, NodeVersionSource};
pub use packager::{PackError, copy_lockfile, copy_npmrc, pack_and_extract};
pub use plan::{BuildPlan, PlanError, compute_tag, is_valid_image_name};
pub use staging::{StagingArea, StagingError};
