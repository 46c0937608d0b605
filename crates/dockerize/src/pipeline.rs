use dockerize_build::dockerfile::{self, DockerfileSource, TemplateData};
use dockerize_build::{
    BuildPlan, NodeDistIndex, NodeVersionSource, StagingArea, compute_tag, copy_lockfile,
    copy_npmrc, pack_and_extract,
};
use dockerize_core::{BuildRequest, PackageDescriptor};
use dockerize_tools::{DockerClient, NpmClient, RealExecutor, ToolExecutor, format_size};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::report::{BuildResult, format_duration};
use crate::settings::Settings;

/// Runs the containerization pipeline for one npm package.
///
/// ```text
/// validate options
///   → describe package.json → compute tag      (no processes yet)
///   → docker version                           (preflight)
///   → acquire staging
///   → [node version | .npmrc | lockfile]       (concurrent)
///   → resolve Dockerfile
///   → [npm pack + extract | write Dockerfile]  (concurrent)
///   → docker build
///   → [image size | release staging]           (concurrent)
///   → docker push                              (optional)
/// ```
///
/// The staging area is released on every path once acquired.
pub struct Dockerizer<D = RealExecutor, N = RealExecutor, V = NodeDistIndex>
where
    D: ToolExecutor,
    N: ToolExecutor,
    V: NodeVersionSource,
{
    docker: DockerClient<D>,
    npm: NpmClient<N>,
    versions: V,
    settings: Settings,
}

impl Dockerizer {
    /// Real `docker`, `npm` and the nodejs.org release index.
    pub fn new(settings: Settings) -> Self {
        Self::with_parts(
            DockerClient::new(),
            NpmClient::new(),
            NodeDistIndex::new(),
            settings,
        )
    }
}

/// What the build stage learned, reported back in the result.
struct Built {
    node_version: String,
    source: DockerfileSource,
    has_lockfile: bool,
    has_npmrc: bool,
}

impl<D, N, V> Dockerizer<D, N, V>
where
    D: ToolExecutor,
    N: ToolExecutor,
    V: NodeVersionSource,
{
    pub fn with_parts(
        docker: DockerClient<D>,
        npm: NpmClient<N>,
        versions: V,
        settings: Settings,
    ) -> Self {
        Self {
            docker,
            npm,
            versions,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate a raw options object, then [`run`](Self::run) it.
    pub async fn dockerize(&self, options: &Value) -> Result<BuildResult> {
        let request = BuildRequest::from_options(options)?;
        self.run(&request).await
    }

    pub async fn run(&self, request: &BuildRequest) -> Result<BuildResult> {
        let started = Instant::now();

        let package = PackageDescriptor::describe(&request.cwd)?;
        let tag = compute_tag(request.tag.as_deref(), &package)?;

        let docker_version = self.docker.server_version().await?;
        debug!(version = %docker_version, "docker daemon reachable");

        let mut staging = match &self.settings.staging_root {
            Some(root) => StagingArea::acquire_in(root)?,
            None => StagingArea::acquire()?,
        };

        let built = self.build(&staging, request, &package, &tag).await;
        let built = match built {
            Ok(built) => built,
            Err(err) => {
                // arch-lint: allow(no-error-swallowing) reason="the build error is the one returned; a cleanup failure on top of it is only reported"
                if let Err(release_err) = staging.release().await {
                    warn!(
                        path = %staging.path().display(),
                        error = %release_err,
                        "failed to remove staging directory"
                    );
                }
                return Err(err);
            }
        };

        let (size, released) = tokio::join!(self.docker.image_size(&tag), staging.release());
        let image_size = size?;
        released?;

        let build_time = started.elapsed();
        info!(
            "Built image {tag} ({}) in {}.",
            format_size(image_size),
            format_duration(build_time)
        );

        let push_time = if request.push {
            Some(self.push(&tag).await?)
        } else {
            None
        };

        Ok(BuildResult {
            tag,
            image_size,
            node_version: built.node_version,
            dockerfile: built.source.kind(),
            has_lockfile: built.has_lockfile,
            has_npmrc: built.has_npmrc,
            build_time,
            push_time,
        })
    }

    /// Fill the staging area and run `docker build` against it.
    async fn build(
        &self,
        staging: &StagingArea,
        request: &BuildRequest,
        package: &PackageDescriptor,
        tag: &str,
    ) -> Result<Built> {
        let package_dir = staging.package_dir();
        let (node_version, npmrc, lockfile) = tokio::join!(
            self.node_version(request),
            copy_npmrc(request.npmrc.as_ref(), &request.cwd, staging.path()),
            copy_lockfile(&package.root, &package_dir),
        );
        let node_version = node_version?;
        let has_npmrc = npmrc?;
        let has_lockfile = lockfile?;

        let plan = BuildPlan::new(
            tag.to_owned(),
            request,
            node_version,
            staging.dockerfile_path(),
        );
        let data = TemplateData {
            entry: package.entry.clone(),
            env_vars: plan.env.clone(),
            has_lockfile,
            node_version: plan.node_version.clone(),
            ubuntu_version: plan.ubuntu_version.clone(),
            tini_version: plan.tini_version.clone(),
            has_npmrc,
        };
        let source = dockerfile::resolve(request.dockerfile.as_deref(), &request.cwd, data).await?;

        log_metadata(request, package, staging, &plan, &source, has_lockfile);

        let (packed, written) = tokio::join!(
            pack_and_extract(&self.npm, &package.root, staging.path()),
            dockerfile::materialize(&source, &plan.dockerfile),
        );
        packed?;
        written?;

        info!("Building image {tag}...");
        self.docker
            .build(
                staging.path(),
                &plan.build_flags(),
                self.settings.verbosity.streams_tool_output(),
            )
            .await?;

        Ok(Built {
            node_version: plan.node_version,
            source,
            has_lockfile,
            has_npmrc,
        })
    }

    /// Explicit version if requested, otherwise the current LTS.
    async fn node_version(&self, request: &BuildRequest) -> Result<String> {
        match &request.node_version {
            Some(version) => Ok(version.clone()),
            None => Ok(self.versions.latest_lts().await?),
        }
    }

    async fn push(&self, tag: &str) -> Result<Duration> {
        let started = Instant::now();
        info!("Pushing image {tag}...");

        self.docker
            .push(tag, self.settings.verbosity.streams_tool_output())
            .await?;

        let elapsed = started.elapsed();
        info!("Pushed image {tag} in {}.", format_duration(elapsed));
        Ok(elapsed)
    }
}

fn log_metadata(
    request: &BuildRequest,
    package: &PackageDescriptor,
    staging: &StagingArea,
    plan: &BuildPlan,
    source: &DockerfileSource,
    has_lockfile: bool,
) {
    info!("Dockerizing package {}.", package.name);
    debug!("- Package Root: {}", package.root.display());
    debug!("- Staging Directory: {}", staging.path().display());
    if let Some(extra) = &plan.extra_args {
        debug!("- Extra Docker Args: {extra}");
    }
    debug!("- Docker Command: \"{}\"", plan.command_line(staging.path()));

    match source.path() {
        Some(path) => info!("- Dockerfile: {}", path.display()),
        None => info!("- Dockerfile: {}", source.kind()),
    }
    info!("- Entrypoint: {}", package.entry);
    info!("- Node Version: {}", plan.node_version);
    info!("- Lockfile: {has_lockfile}");

    if !plan.env.is_empty() {
        info!("- Environment Variables:");
        for var in &plan.env {
            info!("  - {var}");
        }
    }

    if !request.labels.is_empty() {
        info!("- Labels:");
        for label in &request.labels {
            match label.split_once('=') {
                Some((key, value)) => info!("  - {key}: {value}"),
                None => info!("  - {label}:"),
            }
        }
    }
}
