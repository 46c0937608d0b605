use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// File name searched for when locating the package root.
pub const PACKAGE_JSON: &str = "package.json";

/// Metadata extracted from the nearest `package.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Full package name, including any `@scope/` prefix.
    pub name: String,
    pub version: String,
    /// First declared `bin` entry, else `main`. Becomes the image ENTRYPOINT.
    pub entry: String,
    /// Directory containing `package.json`.
    pub root: PathBuf,
}

#[derive(Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    bin: Option<BinField>,
    main: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BinField {
    Single(String),
    Named(Map<String, Value>),
}

impl PackageDescriptor {
    /// Read the `package.json` at or above `dir`.
    ///
    /// # Errors
    ///
    /// - [`Error::PackageNotFound`](crate::Error::PackageNotFound) if no ancestor has a `package.json`
    /// - [`Error::MissingPackageField`](crate::Error::MissingPackageField) without `name` or `version`
    /// - [`Error::NoEntryPoint`](crate::Error::NoEntryPoint) without `bin` or `main`
    pub fn describe(dir: &Path) -> crate::Result<Self> {
        let start = std::path::absolute(dir).map_err(|e| crate::Error::DirResolve {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let manifest_path =
            find_up(&start, PACKAGE_JSON).ok_or_else(|| crate::Error::PackageNotFound {
                dir: start.clone(),
            })?;
        tracing::debug!(path = %manifest_path.display(), "reading package manifest");

        let content =
            std::fs::read_to_string(&manifest_path).map_err(|e| crate::Error::PackageRead {
                path: manifest_path.clone(),
                source: e,
            })?;

        let parsed: PackageJson =
            serde_json::from_str(&content).map_err(|e| crate::Error::PackageParse {
                path: manifest_path.clone(),
                source: e,
            })?;

        let name = parsed
            .name
            .ok_or_else(|| crate::Error::MissingPackageField {
                path: manifest_path.clone(),
                field: "name",
            })?;
        let version = parsed
            .version
            .ok_or_else(|| crate::Error::MissingPackageField {
                path: manifest_path.clone(),
                field: "version",
            })?;

        let entry = Self::resolve_entry(parsed.bin, parsed.main)
            .ok_or_else(|| crate::Error::NoEntryPoint {
                package: name.clone(),
            })?;

        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| crate::Error::PackageNotFound { dir: start })?;

        Ok(Self {
            name,
            version,
            entry,
            root,
        })
    }

    /// Entry point priority: first `bin` (string form, or first value in
    /// declaration order), then `main`.
    fn resolve_entry(bin: Option<BinField>, main: Option<String>) -> Option<String> {
        let from_bin = match bin {
            Some(BinField::Single(path)) => Some(path),
            Some(BinField::Named(map)) => map
                .into_iter()
                .find_map(|(_, v)| v.as_str().map(str::to_owned)),
            None => None,
        };
        from_bin.or(main).filter(|e| !e.is_empty())
    }

    /// Scope without the `@` sigil (`@org/app` → `org`). Empty when unscoped.
    pub fn scope(&self) -> &str {
        match self.name.split_once('/') {
            Some((scope, _)) => scope.trim_start_matches('@'),
            None => "",
        }
    }

    /// Name without the scope (`@org/app` → `app`).
    pub fn short_name(&self) -> &str {
        match self.name.rsplit_once('/') {
            Some((_, short)) => short,
            None => &self.name,
        }
    }
}

/// Walk from `start` toward the filesystem root and return the first
/// `file_name` that exists as a regular file.
pub fn find_up(start: &Path, file_name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> PackageDescriptor {
        PackageDescriptor {
            name: name.to_owned(),
            version: "1.0.0".to_owned(),
            entry: "index.js".to_owned(),
            root: PathBuf::from("/srv/app"),
        }
    }

    #[test]
    fn scope_and_short_name_for_scoped_package() {
        let pkg = descriptor("@org/app");
        assert_eq!(pkg.scope(), "org");
        assert_eq!(pkg.short_name(), "app");
    }

    #[test]
    fn scope_empty_for_unscoped_package() {
        let pkg = descriptor("app");
        assert_eq!(pkg.scope(), "");
        assert_eq!(pkg.short_name(), "app");
    }

    #[test]
    fn bin_takes_priority_over_main() {
        let mut map = Map::new();
        map.insert("cli".to_owned(), Value::String("bin/cli.js".to_owned()));
        map.insert("other".to_owned(), Value::String("bin/other.js".to_owned()));

        let entry = PackageDescriptor::resolve_entry(
            Some(BinField::Named(map)),
            Some("index.js".to_owned()),
        );
        assert_eq!(entry.as_deref(), Some("bin/cli.js"));
    }

    #[test]
    fn main_used_without_bin() {
        let entry = PackageDescriptor::resolve_entry(None, Some("dist/server.js".to_owned()));
        assert_eq!(entry.as_deref(), Some("dist/server.js"));
    }

    #[test]
    fn no_entry_without_bin_or_main() {
        assert!(PackageDescriptor::resolve_entry(None, None).is_none());
    }
}
