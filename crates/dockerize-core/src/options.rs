//! Build request validation.
//!
//! Library callers and the CLI both describe a build as a loosely typed
//! options object (the same camelCase keys the `dockerize.toml` / CLI layer
//! produces). [`BuildRequest::from_options`] checks every field's shape before
//! anything touches the filesystem and yields the typed request the pipeline
//! consumes.

use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::{Error, Result};

/// Value of the `npmrc` option that selects the nearest `.npmrc` file.
pub const NEAREST_NPMRC: &str = "true";

/// Where the `.npmrc` used during `npm install` in the image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NpmrcSource {
    /// Explicit path; must exist.
    Path(PathBuf),
    /// Nearest `.npmrc` at or above the working directory, if any.
    Nearest,
}

impl NpmrcSource {
    fn parse(value: String) -> Self {
        if value == NEAREST_NPMRC {
            Self::Nearest
        } else {
            Self::Path(PathBuf::from(value))
        }
    }
}

/// A validated request to containerize the package at `cwd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Directory of the project to containerize.
    pub cwd: PathBuf,
    /// Tag override, may contain `{{packageName}}`-style placeholders.
    pub tag: Option<String>,
    /// Node version to install. Defaults to the current LTS.
    pub node_version: Option<String>,
    /// Ubuntu version for the base image.
    pub ubuntu_version: Option<String>,
    /// `KEY=VALUE` label expressions.
    pub labels: Vec<String>,
    /// `KEY=VALUE` environment variable expressions.
    pub env: Vec<String>,
    /// Extra arguments appended verbatim to `docker build`.
    pub extra_args: Option<String>,
    /// Custom Dockerfile path.
    pub dockerfile: Option<PathBuf>,
    pub npmrc: Option<NpmrcSource>,
    /// Run `docker push` after a successful build.
    pub push: bool,
}

impl BuildRequest {
    /// A request with only the working directory set.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            tag: None,
            node_version: None,
            ubuntu_version: None,
            labels: Vec::new(),
            env: Vec::new(),
            extra_args: None,
            dockerfile: None,
            npmrc: None,
            push: false,
        }
    }

    /// Validate a raw options object and convert it into a request.
    ///
    /// Fields are checked in a fixed order and the first violation is
    /// reported. `null` counts as absent, and so does an empty string for the
    /// optional scalar fields.
    ///
    /// # Errors
    ///
    /// - [`Error::OptionsNotObject`] if `options` is not a JSON object
    /// - [`Error::InvalidOption`] naming the first malformed field
    pub fn from_options(options: &Value) -> Result<Self> {
        let map = options.as_object().ok_or_else(|| Error::OptionsNotObject {
            actual: describe(options),
        })?;

        let cwd = required_string(map, "cwd")?;
        let tag = optional_string(map, "tag")?;
        let node_version = optional_string(map, "nodeVersion")?;
        let ubuntu_version = optional_string(map, "ubuntuVersion")?;
        let labels = string_or_list(map, "labels")?;
        let env = string_or_list(map, "env")?;
        let extra_args = optional_string(map, "extraArgs")?;
        let dockerfile = optional_string(map, "dockerfile")?;
        let npmrc = optional_string(map, "npmrc")?;
        let push = optional_bool(map, "push")?;

        Ok(Self {
            cwd: PathBuf::from(cwd),
            tag,
            node_version,
            ubuntu_version,
            labels,
            env,
            extra_args,
            dockerfile: dockerfile.map(PathBuf::from),
            npmrc: npmrc.map(NpmrcSource::parse),
            push: push == Some(true),
        })
    }
}

fn present<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|v| !v.is_null())
}

fn required_string(map: &Map<String, Value>, field: &'static str) -> Result<String> {
    const EXPECTED: &str = "a non-empty string";
    match present(map, field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(other) => Err(invalid(field, EXPECTED, other)),
        None => Err(Error::InvalidOption {
            field,
            expected: EXPECTED,
            actual: "nothing".to_owned(),
        }),
    }
}

fn optional_string(map: &Map<String, Value>, field: &'static str) -> Result<Option<String>> {
    match present(map, field) {
        None => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(field, "a string", other)),
    }
}

/// Accepts `"a=b"` or `["a=b", "c=d"]`; both flatten to a list.
fn string_or_list(map: &Map<String, Value>, field: &'static str) -> Result<Vec<String>> {
    const EXPECTED: &str = "a string or a list of strings";
    match present(map, field) {
        None => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(Error::InvalidOption {
                    field,
                    expected: EXPECTED,
                    actual: format!("a list containing {}", describe(other)),
                }),
            })
            .collect(),
        Some(other) => Err(invalid(field, EXPECTED, other)),
    }
}

fn optional_bool(map: &Map<String, Value>, field: &'static str) -> Result<Option<bool>> {
    match present(map, field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(invalid(field, "a boolean", other)),
    }
}

fn invalid(field: &'static str, expected: &'static str, actual: &Value) -> Error {
    Error::InvalidOption {
        field,
        expected,
        actual: describe(actual),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => format!("boolean `{b}`"),
        Value::Number(n) => format!("number `{n}`"),
        Value::String(s) if s.is_empty() => "an empty string".to_owned(),
        Value::String(s) => format!("string `{s}`"),
        Value::Array(_) => "a list".to_owned(),
        Value::Object(_) => "an object".to_owned(),
    }
}
