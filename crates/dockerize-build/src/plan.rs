use dockerize_core::{BuildRequest, DEFAULT_TINI_VERSION, DEFAULT_UBUNTU_VERSION, ErrorKind, PackageDescriptor};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const PACKAGE_NAME_PLACEHOLDER: &str = "{{packageName}}";
pub const PACKAGE_SCOPE_PLACEHOLDER: &str = "{{packageScope}}";
pub const PACKAGE_VERSION_PLACEHOLDER: &str = "{{packageVersion}}";

/// Optional `scope/` prefix, a name, optional `:version` suffix.
static IMAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9._-]+/)?[a-z0-9._-]+(?::[a-zA-Z0-9._-]+)?$")
        .expect("image name pattern is valid")
});

pub fn is_valid_image_name(tag: &str) -> bool {
    IMAGE_NAME.is_match(tag)
}

/// Final image tag for `package`.
///
/// Without an override the tag is `<scope>/<name>:<version>` (scope omitted
/// for unscoped packages). An override may reference the package through
/// `{{packageName}}`, `{{packageScope}}` and `{{packageVersion}}`; only the
/// first occurrence of each is substituted. Either way the result must
/// match the image-name grammar.
pub fn compute_tag(tag_override: Option<&str>, package: &PackageDescriptor) -> Result<String, PlanError> {
    let tag = match tag_override {
        Some(template) => template
            .replacen(PACKAGE_NAME_PLACEHOLDER, package.short_name(), 1)
            .replacen(PACKAGE_SCOPE_PLACEHOLDER, package.scope(), 1)
            .replacen(PACKAGE_VERSION_PLACEHOLDER, &package.version, 1),
        None => match package.scope() {
            "" => format!("{}:{}", package.short_name(), package.version),
            scope => format!("{scope}/{}:{}", package.short_name(), package.version),
        },
    };

    if is_valid_image_name(&tag) {
        Ok(tag)
    } else {
        Err(PlanError::InvalidImageName(tag))
    }
}

/// Everything `docker build` needs once the Node version is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub tag: String,
    pub node_version: String,
    pub ubuntu_version: String,
    pub tini_version: String,
    /// `KEY=VALUE` label pairs, user labels last.
    pub labels: Vec<String>,
    /// `KEY=VALUE` pairs baked into the generated Dockerfile.
    pub env: Vec<String>,
    pub extra_args: Option<String>,
    /// Where the Dockerfile lives inside the staging area.
    pub dockerfile: PathBuf,
}

impl BuildPlan {
    pub fn new(tag: String, request: &BuildRequest, node_version: String, dockerfile: PathBuf) -> Self {
        let ubuntu_version = request
            .ubuntu_version
            .clone()
            // arch-lint: allow(no-silent-result-drop) reason="Option default; an absent ubuntu version means the stock base image"
            .unwrap_or_else(|| DEFAULT_UBUNTU_VERSION.to_owned());
        let tini_version = DEFAULT_TINI_VERSION.to_owned();

        let mut labels = vec![
            format!("NODE_VERSION={node_version}"),
            format!("UBUNTU_VERSION={ubuntu_version}"),
            format!("TINI_VERSION={tini_version}"),
        ];
        labels.extend(request.labels.iter().cloned());

        Self {
            tag,
            node_version,
            ubuntu_version,
            tini_version,
            labels,
            env: request.env.clone(),
            extra_args: request.extra_args.clone(),
            dockerfile,
        }
    }

    /// Flags passed after `docker build <context>`.
    ///
    /// `--rm`, `--tag=<tag>`, one `--label=` per label, then `extra_args`
    /// split on whitespace.
    pub fn build_flags(&self) -> Vec<String> {
        let mut flags = vec!["--rm".to_owned(), format!("--tag={}", self.tag)];
        flags.extend(self.labels.iter().map(|label| format!("--label={label}")));
        if let Some(extra) = &self.extra_args {
            flags.extend(extra.split_whitespace().map(str::to_owned));
        }
        flags
    }

    /// Shell-like rendering of the build command, for logs.
    pub fn command_line(&self, context: &Path) -> String {
        let mut line = format!("docker build {}", context.display());
        for flag in self.build_flags() {
            line.push(' ');
            line.push_str(&flag);
        }
        line
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Invalid image name: {0}")]
    InvalidImageName(String),
}

impl PlanError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn package(name: &str, version: &str) -> PackageDescriptor {
        PackageDescriptor {
            name: name.to_owned(),
            version: version.to_owned(),
            entry: "index.js".to_owned(),
            root: PathBuf::from("/srv/app"),
        }
    }

    fn plan(request: &BuildRequest) -> BuildPlan {
        BuildPlan::new(
            "app:1.2.3".to_owned(),
            request,
            "22.11.0".to_owned(),
            PathBuf::from("/tmp/staging/Dockerfile"),
        )
    }

    #[test]
    fn default_tag_unscoped() {
        let tag = compute_tag(None, &package("app", "1.2.3")).unwrap();
        assert_eq!(tag, "app:1.2.3");
    }

    #[test]
    fn default_tag_scoped_drops_at_sign() {
        let tag = compute_tag(None, &package("@org/app", "2.0.0")).unwrap();
        assert_eq!(tag, "org/app:2.0.0");
    }

    #[test]
    fn override_substitutes_placeholders() {
        let tag = compute_tag(
            Some("registry.local/{{packageScope}}-{{packageName}}:{{packageVersion}}"),
            &package("@org/app", "2.0.0"),
        )
        .unwrap();
        assert_eq!(tag, "registry.local/org-app:2.0.0");

        let tag = compute_tag(
            Some("{{packageScope}}/{{packageName}}:v{{packageVersion}}"),
            &package("@org/app", "2.0.0"),
        )
        .unwrap();
        assert_eq!(tag, "org/app:v2.0.0");
    }

    #[test]
    fn override_substitutes_first_occurrence_only() {
        let err = compute_tag(
            Some("{{packageName}}-{{packageName}}"),
            &package("app", "1.0.0"),
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::InvalidImageName(ref t) if t == "app-{{packageName}}"));
    }

    #[test]
    fn override_without_placeholders_is_used_verbatim() {
        let tag = compute_tag(Some("my-image:latest"), &package("app", "1.0.0")).unwrap();
        assert_eq!(tag, "my-image:latest");
    }

    #[test]
    fn invalid_tag_is_validation_error() {
        let err = compute_tag(Some("UPPER CASE!"), &package("app", "1.0.0")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Invalid image name: UPPER CASE!");
    }

    #[test]
    fn image_name_grammar() {
        assert!(is_valid_image_name("app"));
        assert!(is_valid_image_name("app:1.2.3"));
        assert!(is_valid_image_name("org/app:2.0.0-RC.1"));
        assert!(is_valid_image_name("my_org/my.app"));
        assert!(!is_valid_image_name(""));
        assert!(!is_valid_image_name("App"));
        assert!(!is_valid_image_name("org/"));
        assert!(!is_valid_image_name("a/b/c"));
        assert!(!is_valid_image_name("app:"));
        assert!(!is_valid_image_name("app:1:2"));
    }

    #[test]
    fn builtin_labels_precede_user_labels() {
        let mut request = BuildRequest::new("/srv/app");
        request.labels = vec!["maintainer=me".to_owned()];

        let plan = plan(&request);

        assert_eq!(
            plan.labels,
            vec![
                "NODE_VERSION=22.11.0",
                "UBUNTU_VERSION=20.10",
                "TINI_VERSION=0.19.0",
                "maintainer=me",
            ]
        );
    }

    #[test]
    fn ubuntu_version_override() {
        let mut request = BuildRequest::new("/srv/app");
        request.ubuntu_version = Some("22.04".to_owned());

        let plan = plan(&request);

        assert_eq!(plan.ubuntu_version, "22.04");
        assert!(plan.labels.contains(&"UBUNTU_VERSION=22.04".to_owned()));
    }

    #[test]
    fn build_flags_order() {
        let mut request = BuildRequest::new("/srv/app");
        request.labels = vec!["team=web".to_owned()];
        request.extra_args = Some("  --no-cache   --pull ".to_owned());

        let flags = plan(&request).build_flags();

        assert_eq!(
            flags,
            vec![
                "--rm",
                "--tag=app:1.2.3",
                "--label=NODE_VERSION=22.11.0",
                "--label=UBUNTU_VERSION=20.10",
                "--label=TINI_VERSION=0.19.0",
                "--label=team=web",
                "--no-cache",
                "--pull",
            ]
        );
    }

    #[test]
    fn command_line_starts_with_context() {
        let request = BuildRequest::new("/srv/app");
        let line = plan(&request).command_line(Path::new("/tmp/staging"));
        assert!(line.starts_with("docker build /tmp/staging --rm --tag=app:1.2.3"));
    }

    proptest! {
        #[test]
        fn default_tag_is_always_valid(
            scope in proptest::option::of("[a-z0-9][a-z0-9._-]{0,12}"),
            name in "[a-z0-9][a-z0-9._-]{0,20}",
            version in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}(-[a-z0-9.]{1,8})?",
        ) {
            let full = match &scope {
                Some(s) => format!("@{s}/{name}"),
                None => name.clone(),
            };
            let tag = compute_tag(None, &package(&full, &version)).unwrap();

            prop_assert!(is_valid_image_name(&tag));
            let suffix = format!("{name}:{version}");
            prop_assert!(tag.ends_with(&suffix));
            prop_assert!(!tag.contains('@'));
        }

        #[test]
        fn extra_args_never_produce_empty_flags(extra in "[ a-z-]{0,40}") {
            let mut request = BuildRequest::new("/srv/app");
            request.extra_args = Some(extra);

            let flags = plan(&request).build_flags();

            prop_assert!(flags.iter().all(|f| !f.is_empty()));
            prop_assert_eq!(&flags[0], "--rm");
        }
    }
}
