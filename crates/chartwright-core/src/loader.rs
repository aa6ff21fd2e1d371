//! Loading a template directory from disk
//!
//! Layout:
//!
//! ```text
//! my-template/
//!   Template.yaml        # apiVersion + the template and its declarations
//!   versions/
//!     1.0.0.yaml         # one ChartVersion per file
//!     1.1.0.yaml
//! ```
//!
//! Versions declared inline in `Template.yaml` come first, followed by the
//! files under `versions/` in file-name order.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::model::{ChartVersion, Template};

pub const API_VERSION: &str = "chartwright/v1";
pub const TEMPLATE_FILE: &str = "Template.yaml";
pub const VERSIONS_DIR: &str = "versions";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateFile {
    api_version: String,

    #[serde(flatten)]
    template: Template,
}

/// A template materialized from a directory, with all its versions
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub template: Template,

    /// Files the versions were read from, parallel to `template.versions`.
    /// Inline versions have no file.
    pub version_files: Vec<Option<PathBuf>>,
}

impl LoadedTemplate {
    /// Load a template from a directory
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();

        if !root.exists() {
            return Err(CoreError::TemplateNotFound {
                path: root.display().to_string(),
            });
        }

        let template_file = root.join(TEMPLATE_FILE);
        if !template_file.exists() {
            return Err(CoreError::InvalidTemplate {
                message: format!("{} not found in {}", TEMPLATE_FILE, root.display()),
            });
        }

        let content = std::fs::read_to_string(&template_file)?;
        let file: TemplateFile = serde_yaml::from_str(&content)?;

        if file.api_version != API_VERSION {
            return Err(CoreError::InvalidTemplate {
                message: format!(
                    "Unsupported API version: {}. Expected: {}",
                    file.api_version, API_VERSION
                ),
            });
        }

        let mut template = file.template;
        let mut version_files: Vec<Option<PathBuf>> = vec![None; template.versions.len()];

        for path in Self::version_paths(&root)? {
            let content = std::fs::read_to_string(&path)?;
            let version: ChartVersion =
                serde_yaml::from_str(&content).map_err(|e| CoreError::InvalidTemplate {
                    message: format!("{}: {}", path.display(), e),
                })?;
            tracing::debug!(path = %path.display(), version = %version.version_name, "loaded version");
            template.versions.push(version);
            version_files.push(Some(path));
        }

        template.assign_ids();

        tracing::debug!(
            template = %template.name,
            services = template.services.len(),
            ingresses = template.ingresses.len(),
            versions = template.versions.len(),
            "loaded template"
        );

        Ok(Self {
            template,
            version_files,
        })
    }

    /// YAML files under `versions/`, sorted by file name
    fn version_paths(root: &Path) -> Result<Vec<PathBuf>> {
        let dir = root.join(VERSIONS_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|e| e.to_str()),
                        Some("yaml") | Some("yml")
                    )
            })
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Find a version by id or name
    pub fn version(&self, key: &str) -> Result<&ChartVersion> {
        self.template
            .version(key)
            .ok_or_else(|| CoreError::VersionNotFound {
                name: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_template(dir: &Path, body: &str) {
        fs::write(dir.join(TEMPLATE_FILE), body).unwrap();
    }

    #[test]
    fn test_load_with_version_files() {
        let dir = TempDir::new().unwrap();
        write_template(
            dir.path(),
            r#"apiVersion: chartwright/v1
name: shop
services:
  - name: api
    routes: [/api]
versions:
  - versionName: inline
"#,
        );
        fs::create_dir(dir.path().join(VERSIONS_DIR)).unwrap();
        fs::write(
            dir.path().join("versions/2.0.yaml"),
            "versionName: \"2.0\"\nvalues:\n  enableRedis: true\n",
        )
        .unwrap();
        fs::write(dir.path().join("versions/1.0.yml"), "versionName: \"1.0\"\n").unwrap();
        fs::write(dir.path().join("versions/README.md"), "ignored").unwrap();

        let loaded = LoadedTemplate::load(dir.path()).unwrap();
        let names: Vec<&str> = loaded
            .template
            .versions
            .iter()
            .map(|v| v.version_name.as_str())
            .collect();

        assert_eq!(names, vec!["inline", "1.0", "2.0"]);
        assert_eq!(loaded.version_files.len(), 3);
        assert!(loaded.version_files[0].is_none());
        assert_eq!(loaded.version("2.0").unwrap().values.enable_redis, Some(true));
        assert_eq!(loaded.template.versions[1].template_id, "shop");
    }

    #[test]
    fn test_missing_directory() {
        let err = LoadedTemplate::load("/nonexistent/chartwright").unwrap_err();
        assert!(matches!(err, CoreError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_missing_template_file() {
        let dir = TempDir::new().unwrap();
        let err = LoadedTemplate::load(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_wrong_api_version() {
        let dir = TempDir::new().unwrap();
        write_template(dir.path(), "apiVersion: chartwright/v0\nname: shop\n");

        let err = LoadedTemplate::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported API version"));
    }

    #[test]
    fn test_unknown_version() {
        let dir = TempDir::new().unwrap();
        write_template(dir.path(), "apiVersion: chartwright/v1\nname: shop\n");

        let loaded = LoadedTemplate::load(dir.path()).unwrap();
        assert!(matches!(
            loaded.version("9.9"),
            Err(CoreError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_version_file_names_path() {
        let dir = TempDir::new().unwrap();
        write_template(dir.path(), "apiVersion: chartwright/v1\nname: shop\n");
        fs::create_dir(dir.path().join(VERSIONS_DIR)).unwrap();
        fs::write(dir.path().join("versions/bad.yaml"), "values: [").unwrap();

        let err = LoadedTemplate::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }
}
