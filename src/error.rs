//! Error types for license extraction and publishing.
//!
//! Every variant carries enough context (label text, coordinates, URL, status
//! code) for a human to act on it without re-running with more logging.

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;

/// One or more license labels have no SPDX mapping.
///
/// `labels` is sorted so the message is stable between runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no SPDX mapping for license label(s): {}", format_labels(.labels))]
pub struct UnresolvedLicenseError {
    /// Every distinct label that failed to resolve, as written in the manifest.
    pub labels: BTreeSet<String>,
}

fn format_labels(labels: &BTreeSet<String>) -> String {
    labels
        .iter()
        .map(|l| format!("'{l}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The third-party library manifest is missing or malformed.
#[derive(Debug, Error)]
pub enum ManifestFormatError {
    /// No manifest entry was found inside the archive.
    #[error("{file} not found in {archive}")]
    Missing {
        /// File name that was searched for.
        file: &'static str,
        /// Archive that was searched.
        archive: PathBuf,
    },

    /// The manifest or archive could not be read.
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    /// The archive holding the manifest is not a valid ZIP file.
    #[error("failed to open archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The document is not a JSON list of library objects.
    #[error("manifest is not a list of library objects: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Failures talking to the Maven repository or the build server.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Upload requires credentials but none were configured.
    #[error("credentials required to publish {coordinates}; set MAVEN_REPO_USER and MAVEN_REPO_PASSWORD")]
    MissingCredential {
        /// Coordinates that were about to be published.
        coordinates: String,
    },

    /// The existence probe got something other than 200 or 404.
    #[error("server returned unexpected response code {code} for HEAD {url}")]
    UnexpectedServerState {
        /// HTTP status code received.
        code: u16,
        /// URL that was probed.
        url: String,
    },

    /// HTTP request failed or returned a non-success status.
    #[error("{method} {url} failed: {reason}")]
    Transport {
        /// HTTP method used.
        method: &'static str,
        /// URL that was requested.
        url: String,
        /// Status line or client error text.
        reason: String,
    },

    /// The repository's `maven-metadata.xml` could not be read or rewritten.
    #[error("cannot update {url}: {reason}")]
    Metadata {
        /// URL of the metadata document.
        url: String,
        /// Parse or write failure.
        reason: String,
    },

    /// Local file I/O while downloading or uploading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    pub fn transport(method: &'static str, url: &str, reason: impl ToString) -> Self {
        PublishError::Transport {
            method,
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_message_lists_labels_sorted() {
        let err = UnresolvedLicenseError {
            labels: ["zeta", "Alpha", "beta"].iter().map(|s| s.to_string()).collect(),
        };
        assert_eq!(
            err.to_string(),
            "no SPDX mapping for license label(s): 'Alpha', 'beta', 'zeta'"
        );
    }

    #[test]
    fn test_unexpected_state_includes_code_and_url() {
        let err = PublishError::UnexpectedServerState {
            code: 503,
            url: "https://repo.example/a.pom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("https://repo.example/a.pom"));
    }
}
