use serde::Deserialize;

/// One third-party component as listed in `third-party-libraries.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LibraryRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "license")]
    pub license_label: Option<String>,
    #[serde(default, rename = "licenseUrl")]
    pub license_url: Option<String>,
}

impl LibraryRecord {
    /// The license label, if present and not blank.
    pub fn label(&self) -> Option<&str> {
        self.license_label
            .as_deref()
            .filter(|l| !l.trim().is_empty())
    }
}

/// A license label resolved to its SPDX identifier or `WITH` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLicense {
    pub spdx_id: String,
    pub source_url: Option<String>,
}

/// Maven coordinates of the published artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Coordinates {
    /// Repository-relative directory holding all versions of the artifact.
    pub fn artifact_path(&self) -> String {
        format!("{}/{}", self.group_id.replace('.', "/"), self.artifact_id)
    }

    /// Repository-relative directory of this version.
    pub fn version_path(&self) -> String {
        format!("{}/{}", self.artifact_path(), self.version)
    }

    /// Repository-relative path of a file of this version, e.g. `pom` or `zip`.
    pub fn file_path(&self, extension: &str) -> String {
        format!(
            "{}/{}-{}.{}",
            self.version_path(),
            self.artifact_id,
            self.version,
            extension
        )
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}
