use dockerize_core::ErrorKind;
use serde::Deserialize;

/// Release index published by the Node.js project.
pub const NODE_DIST_INDEX: &str = "https://nodejs.org/dist/index.json";

/// Source of the Node.js version used when none is requested.
#[allow(async_fn_in_trait)]
pub trait NodeVersionSource: Send + Sync {
    /// Latest LTS release, without the leading `v` (`"22.11.0"`).
    async fn latest_lts(&self) -> Result<String, NodeVersionError>;
}

/// Reads the LTS version from the Node.js distribution index.
#[derive(Debug, Clone)]
pub struct NodeDistIndex {
    client: reqwest::Client,
    url: String,
}

impl NodeDistIndex {
    pub fn new() -> Self {
        Self::with_url(NODE_DIST_INDEX)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl Default for NodeDistIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeVersionSource for NodeDistIndex {
    async fn latest_lts(&self) -> Result<String, NodeVersionError> {
        let fetch_error = |e| NodeVersionError::Fetch {
            url: self.url.clone(),
            source: e,
        };

        let releases: Vec<Release> = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_error)?
            .json()
            .await
            .map_err(fetch_error)?;

        let version = latest_lts(&releases).ok_or_else(|| NodeVersionError::NoLts {
            url: self.url.clone(),
        })?;

        tracing::debug!(version, "resolved Node.js LTS");
        Ok(version.to_owned())
    }
}

/// One entry of `index.json`. `lts` is `false` or the LTS codename.
#[derive(Debug, Deserialize)]
struct Release {
    version: String,
    #[serde(default)]
    lts: serde_json::Value,
}

impl Release {
    fn is_lts(&self) -> bool {
        !matches!(self.lts, serde_json::Value::Bool(false) | serde_json::Value::Null)
    }
}

/// The index is newest first, so the first LTS entry is the latest.
fn latest_lts(releases: &[Release]) -> Option<&str> {
    releases
        .iter()
        .find(|release| release.is_lts())
        .map(|release| release.version.trim_start_matches('v'))
}

#[derive(Debug, thiserror::Error)]
pub enum NodeVersionError {
    #[error("failed to fetch the Node.js release index from {url}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("no LTS release listed in {url}")]
    NoLts { url: String },
}

impl NodeVersionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ExternalTool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn releases(json: &str) -> Vec<Release> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn picks_first_lts_entry() {
        let index = releases(
            r#"[
                {"version": "v23.3.0", "lts": false},
                {"version": "v22.11.0", "lts": "Jod"},
                {"version": "v20.18.1", "lts": "Iron"}
            ]"#,
        );
        assert_eq!(latest_lts(&index), Some("22.11.0"));
    }

    #[test]
    fn none_without_lts_entries() {
        let index = releases(r#"[{"version": "v23.3.0", "lts": false}, {"version": "v23.2.0"}]"#);
        assert_eq!(latest_lts(&index), None);
    }

    #[test]
    fn none_for_empty_index() {
        assert_eq!(latest_lts(&[]), None);
    }
}
