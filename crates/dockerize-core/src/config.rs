use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File name of the optional per-project configuration.
pub const CONFIG_FILE: &str = "dockerize.toml";

/// Ubuntu release used as the base image when none is given.
pub const DEFAULT_UBUNTU_VERSION: &str = "20.10";

/// tini release installed as the container init process.
pub const DEFAULT_TINI_VERSION: &str = "0.19.0";

/// dockerize.toml configuration
///
/// Every key is optional; values act as defaults that CLI flags override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DockerizeConfig {
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Tag template, e.g. `"{{packageScope}}/{{packageName}}:latest"`
    pub tag: Option<String>,
    /// Labels applied to the image (`KEY=VALUE`)
    #[serde(default)]
    pub labels: Vec<String>,
    /// Push the image after building
    pub push: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Node version installed in the image (defaults to the current LTS)
    pub node_version: Option<String>,
    /// Ubuntu base image version
    pub ubuntu_version: Option<String>,
    /// Environment variables baked into the generated Dockerfile (`KEY=VALUE`)
    #[serde(default)]
    pub env: Vec<String>,
    /// Extra arguments appended to `docker build`
    pub extra_args: Option<String>,
    /// Custom Dockerfile, relative to the working directory
    pub dockerfile: Option<String>,
    /// Path to an .npmrc, or `"true"` for the nearest one
    pub npmrc: Option<String>,
}

impl DockerizeConfig {
    /// Load from dockerize.toml in the given directory, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Configured values as a raw options object (camelCase keys, absent
    /// values omitted), ready to be overlaid with CLI flags and passed to
    /// [`BuildRequest::from_options`](crate::BuildRequest::from_options).
    pub fn to_options(&self) -> Map<String, Value> {
        let mut options = Map::new();

        let mut put = |key: &str, value: Option<&String>| {
            if let Some(v) = value {
                options.insert(key.to_owned(), Value::String(v.clone()));
            }
        };
        put("tag", self.image.tag.as_ref());
        put("nodeVersion", self.build.node_version.as_ref());
        put("ubuntuVersion", self.build.ubuntu_version.as_ref());
        put("extraArgs", self.build.extra_args.as_ref());
        put("dockerfile", self.build.dockerfile.as_ref());
        put("npmrc", self.build.npmrc.as_ref());

        if !self.image.labels.is_empty() {
            options.insert("labels".to_owned(), string_list(&self.image.labels));
        }
        if !self.build.env.is_empty() {
            options.insert("env".to_owned(), string_list(&self.build.env));
        }
        if let Some(push) = self.image.push {
            options.insert("push".to_owned(), Value::Bool(push));
        }

        options
    }
}

fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}
