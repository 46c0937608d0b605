use clap::Args;
use dockerize::{DockerizeConfig, Dockerizer, NEAREST_NPMRC, Settings, Verbosity};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Package directory (defaults to the current directory)
    pub cwd: Option<PathBuf>,

    /// Image tag; may use {{packageName}}, {{packageScope}}, {{packageVersion}}
    #[arg(long, short = 't')]
    pub tag: Option<String>,

    /// Node.js version to install (defaults to the latest LTS)
    #[arg(long, conflicts_with = "dockerfile")]
    pub node_version: Option<String>,

    /// Ubuntu base image version
    #[arg(long, conflicts_with = "dockerfile")]
    pub ubuntu_version: Option<String>,

    /// Image label, repeatable
    #[arg(long = "label", short = 'l', value_name = "KEY=VALUE")]
    pub labels: Vec<String>,

    /// Environment variable baked into the image, repeatable
    #[arg(long = "env", short = 'e', value_name = "KEY=VALUE", conflicts_with = "dockerfile")]
    pub env: Vec<String>,

    /// Extra flags appended to `docker build`
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub extra_args: Option<String>,

    /// .npmrc to install with; `true` uses the nearest one
    #[arg(long, value_name = "PATH", conflicts_with = "dockerfile")]
    pub npmrc: Option<String>,

    /// Push the image after building
    #[arg(long)]
    pub push: bool,

    /// Use this Dockerfile instead of the generated one
    #[arg(long, value_name = "PATH")]
    pub dockerfile: Option<PathBuf>,
}

/// Build (and optionally push) the image for the package in `args.cwd`.
///
/// Defaults come from `dockerize.toml` in the package directory, when present.
pub async fn build(args: BuildArgs, verbosity: Verbosity) -> anyhow::Result<()> {
    let cwd = match &args.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let config = DockerizeConfig::load(&cwd)?;
    let options = merge_options(&cwd, &config, &args);

    let dockerizer = Dockerizer::new(Settings::new(verbosity));
    let result = dockerizer.dockerize(&Value::Object(options)).await?;

    tracing::debug!(
        size = result.image_size,
        dockerfile = %result.dockerfile,
        pushed = result.pushed(),
        "done"
    );
    println!("{}", result.tag);
    Ok(())
}

/// Config values first, then flags. Scalar flags replace configured values;
/// labels and env are appended after the configured ones. Relative paths in
/// the config file are taken relative to the package directory.
fn merge_options(cwd: &Path, config: &DockerizeConfig, args: &BuildArgs) -> Map<String, Value> {
    let mut options = config.to_options();

    for key in ["dockerfile", "npmrc"] {
        let resolved = match options.get(key) {
            Some(Value::String(path)) if path != NEAREST_NPMRC && Path::new(path).is_relative() => {
                Some(cwd.join(path).to_string_lossy().into_owned())
            }
            _ => None,
        };
        if let Some(resolved) = resolved {
            options.insert(key.to_owned(), Value::String(resolved));
        }
    }

    options.insert(
        "cwd".to_owned(),
        Value::String(cwd.to_string_lossy().into_owned()),
    );

    let mut set = |key: &str, value: Option<String>| {
        if let Some(v) = value {
            options.insert(key.to_owned(), Value::String(v));
        }
    };
    set("tag", args.tag.clone());
    set("nodeVersion", args.node_version.clone());
    set("ubuntuVersion", args.ubuntu_version.clone());
    set("extraArgs", args.extra_args.clone());
    set("npmrc", args.npmrc.clone());
    set(
        "dockerfile",
        args.dockerfile
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
    );

    append(&mut options, "labels", &args.labels);
    append(&mut options, "env", &args.env);

    if args.push {
        options.insert("push".to_owned(), Value::Bool(true));
    }

    options
}

fn append(options: &mut Map<String, Value>, key: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let entry = options
        .entry(key.to_owned())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = entry {
        items.extend(values.iter().cloned().map(Value::String));
    }
}
