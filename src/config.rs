use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::Coordinates;

const CONFIG_DIR: &str = "mps-prerelease-publish";

/// Root configuration structure, deserialized from
/// `.mps-prerelease-publish/config.toml`. Every section is optional.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub artifact: ArtifactConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub http: HttpConfig,
    /// Working directory for downloaded and repackaged archives.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
}

/// Maven repository the prerelease is published to.
#[derive(Debug, Deserialize)]
pub struct RepositoryConfig {
    /// Base URL, without trailing slash.
    #[serde(default = "default_repository_url")]
    pub url: String,
}

/// Maven coordinates and POM description of the published artifact.
#[derive(Debug, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_group_id")]
    pub group_id: String,
    #[serde(default = "default_artifact_id")]
    pub artifact_id: String,
    #[serde(default = "default_description")]
    pub description: String,
}

/// Where distribution archives are fetched from.
#[derive(Debug, Deserialize)]
pub struct DownloadConfig {
    /// URL with `{build_id}` and `{version}` placeholders.
    #[serde(default = "default_url_template")]
    pub url_template: String,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    /// Total time allowed for one request, including archive transfer.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_repository_url() -> String {
    "https://artifacts.itemis.cloud/repository/maven-mps-prereleases".to_string()
}

fn default_group_id() -> String {
    "com.jetbrains.mps".to_string()
}

fn default_artifact_id() -> String {
    "mps-prerelease".to_string()
}

fn default_description() -> String {
    "JetBrains MPS prerelease build".to_string()
}

fn default_url_template() -> String {
    "https://teamcity.jetbrains.com/guestAuth/app/rest/builds/id:{build_id}/artifacts/content/MPS-{version}.zip"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    3600
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: default_repository_url(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            group_id: default_group_id(),
            artifact_id: default_artifact_id(),
            description: default_description(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    /// Built-in configuration used when no config file is found: the itemis
    /// prerelease repository and the public JetBrains TeamCity.
    fn default() -> Self {
        Config {
            repository: RepositoryConfig::default(),
            artifact: ArtifactConfig::default(),
            download: DownloadConfig::default(),
            http: HttpConfig::default(),
            build_dir: default_build_dir(),
        }
    }
}

impl Config {
    pub fn coordinates(&self, version: &str) -> Coordinates {
        Coordinates {
            group_id: self.artifact.group_id.clone(),
            artifact_id: self.artifact.artifact_id.clone(),
            version: version.to_string(),
        }
    }

    pub fn repository_url(&self) -> &str {
        self.repository.url.trim_end_matches('/')
    }

    pub fn download_url(&self, build_id: &str, version: &str) -> String {
        self.download
            .url_template
            .replace("{build_id}", build_id)
            .replace("{version}", version)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.build_dir.join("download")
    }

    pub fn repackage_dir(&self) -> PathBuf {
        self.build_dir.join("repackage")
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `./.mps-prerelease-publish/config.toml`
/// 3. `~/.config/mps-prerelease-publish/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(working_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = working_dir.join(format!(".{CONFIG_DIR}")).join("config.toml");
    if project_config.exists() {
        tracing::debug!(path = %project_config.display(), "using project config");
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join(CONFIG_DIR).join("config.toml");
        if home_config.exists() {
            tracing::debug!(path = %home_config.display(), "using user config");
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
build_dir = "out"

[repository]
url = "https://repo.example/maven/"
"#,
        )
        .unwrap();
        assert_eq!(cfg.repository_url(), "https://repo.example/maven");
        assert_eq!(cfg.artifact.group_id, "com.jetbrains.mps");
        assert_eq!(cfg.build_dir, PathBuf::from("out"));
        assert_eq!(cfg.http.timeout_secs, 3600);
    }

    #[test]
    fn test_download_url_template() {
        let cfg = Config::default();
        assert_eq!(
            cfg.download_url("5123", "2024.3"),
            "https://teamcity.jetbrains.com/guestAuth/app/rest/builds/id:5123/artifacts/content/MPS-2024.3.zip"
        );
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        let cfg_dir = dir.path().join(".mps-prerelease-publish");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("config.toml"),
            "[artifact]\nartifact_id = \"mps-nightly\"\n",
        )
        .unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.artifact.artifact_id, "mps-nightly");
        assert_eq!(
            cfg.coordinates("1.0").to_string(),
            "com.jetbrains.mps:mps-nightly:1.0"
        );
    }

    #[test]
    fn test_override_must_exist() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(dir.path(), Some(&dir.path().join("missing.toml"))).is_err());
    }
}
