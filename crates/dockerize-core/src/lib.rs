//! Core types and configuration for dockerize.
//!
//! This crate defines the build request and its validation
//! ([`BuildRequest`]), `package.json` introspection ([`PackageDescriptor`]),
//! the `dockerize.toml` schema ([`DockerizeConfig`]), and shared error types.

pub mod config;
pub mod error;
pub mod options;
pub mod package;

pub use config::{
    BuildConfig, DEFAULT_TINI_VERSION, DEFAULT_UBUNTU_VERSION, DockerizeConfig, ImageConfig,
};
pub use error::{Error, ErrorKind, Result};
pub use options::{BuildRequest, NEAREST_NPMRC, NpmrcSource};
pub use package::{PackageDescriptor, find_up};
