use dockerize_core::{BuildRequest, DockerizeConfig, NpmrcSource};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn load_returns_defaults_when_no_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = DockerizeConfig::load(tmp.path()).unwrap();

    assert_eq!(config, DockerizeConfig::default());
    assert!(config.image.tag.is_none());
    assert!(config.image.labels.is_empty());
    assert!(config.build.env.is_empty());
    assert!(config.to_options().is_empty());
}

#[test]
fn load_parses_full_config() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[image]
tag = "registry.example/{{packageName}}:{{packageVersion}}"
labels = ["team=platform", "tier=web"]
push = true

[build]
node_version = "20.11.1"
ubuntu_version = "22.04"
env = ["NODE_ENV=production"]
extra_args = "--squash"
dockerfile = "docker/Dockerfile"
npmrc = "true"
"#;
    std::fs::write(tmp.path().join("dockerize.toml"), toml).unwrap();

    let config = DockerizeConfig::load(tmp.path()).unwrap();

    assert_eq!(
        config.image.tag.as_deref(),
        Some("registry.example/{{packageName}}:{{packageVersion}}")
    );
    assert_eq!(config.image.labels, vec!["team=platform", "tier=web"]);
    assert_eq!(config.image.push, Some(true));
    assert_eq!(config.build.node_version.as_deref(), Some("20.11.1"));
    assert_eq!(config.build.ubuntu_version.as_deref(), Some("22.04"));
    assert_eq!(config.build.env, vec!["NODE_ENV=production"]);
    assert_eq!(config.build.extra_args.as_deref(), Some("--squash"));
    assert_eq!(config.build.dockerfile.as_deref(), Some("docker/Dockerfile"));
    assert_eq!(config.build.npmrc.as_deref(), Some("true"));
}

#[test]
fn load_partial_config_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[build]
node_version = "18.19.0"
"#;
    std::fs::write(tmp.path().join("dockerize.toml"), toml).unwrap();

    let config = DockerizeConfig::load(tmp.path()).unwrap();

    assert_eq!(config.build.node_version.as_deref(), Some("18.19.0"));
    assert!(config.image.tag.is_none());
    assert!(config.image.push.is_none());
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("dockerize.toml"), "not valid {{{{ toml").unwrap();

    let result = DockerizeConfig::load(tmp.path());
    assert!(result.is_err());

    let err = result.unwrap_err().to_string();
    assert!(err.contains("parse"));
}

#[test]
fn load_empty_config_returns_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("dockerize.toml"), "").unwrap();

    let config = DockerizeConfig::load(tmp.path()).unwrap();
    assert_eq!(config, DockerizeConfig::default());
}

// ── to_options ──

#[test]
fn to_options_uses_camel_case_keys() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[image]
labels = ["a=b"]
push = false

[build]
node_version = "20.0.0"
extra_args = "--pull"
"#;
    std::fs::write(tmp.path().join("dockerize.toml"), toml).unwrap();

    let options = DockerizeConfig::load(tmp.path()).unwrap().to_options();

    assert_eq!(options["nodeVersion"], "20.0.0");
    assert_eq!(options["extraArgs"], "--pull");
    assert_eq!(options["labels"], Value::Array(vec!["a=b".into()]));
    assert_eq!(options["push"], Value::Bool(false));
    assert!(!options.contains_key("tag"));
    assert!(!options.contains_key("env"));
}

#[test]
fn to_options_passes_validation_once_cwd_is_set() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[image]
tag = "app:dev"

[build]
env = ["PORT=8080", "NODE_ENV=production"]
npmrc = "true"
"#;
    std::fs::write(tmp.path().join("dockerize.toml"), toml).unwrap();

    let mut options = DockerizeConfig::load(tmp.path()).unwrap().to_options();
    options.insert(
        "cwd".to_owned(),
        Value::String(tmp.path().display().to_string()),
    );

    let request = BuildRequest::from_options(&Value::Object(options)).unwrap();
    assert_eq!(request.tag.as_deref(), Some("app:dev"));
    assert_eq!(request.env, vec!["PORT=8080", "NODE_ENV=production"]);
    assert_eq!(request.npmrc, Some(NpmrcSource::Nearest));
    assert!(!request.push);
}
