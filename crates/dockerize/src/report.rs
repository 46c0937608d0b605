use dockerize_build::DockerfileKind;
use dockerize_tools::format_size;
use std::time::Duration;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub tag: String,
    /// Image size in bytes, as reported by `docker image inspect`.
    pub image_size: u64,
    pub node_version: String,
    pub dockerfile: DockerfileKind,
    pub has_lockfile: bool,
    pub has_npmrc: bool,
    /// Time from start of the run until the image was built.
    pub build_time: Duration,
    /// Set when the image was pushed.
    pub push_time: Option<Duration>,
}

impl BuildResult {
    pub fn pushed(&self) -> bool {
        self.push_time.is_some()
    }

    pub fn formatted_size(&self) -> String {
        format_size(self.image_size)
    }
}

/// `850ms`, `12.4s`, `2m 5s`.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
