//! Process execution for the tools dockerize drives.
//!
//! Each external program sits behind a client ([`DockerClient`],
//! [`NpmClient`]) parameterized over a [`ToolExecutor`], so tests can swap in
//! mocks and assert exactly which invocations happen.

pub mod docker;
pub mod error;
pub mod executor;
pub mod npm;

pub use docker::{DockerClient, DockerError, PushError, format_size};
pub use error::ToolError;
pub use executor::{RealExecutor, ToolExecutor};
pub use npm::{NpmClient, NpmError};
