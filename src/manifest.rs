//! Reader for the `third-party-libraries.json` manifest bundled with MPS.
//!
//! The manifest is a JSON array of library objects. Only `license`,
//! `licenseUrl` and `name` are read; other fields are ignored.

use std::path::Path;

use crate::archive;
use crate::error::ManifestFormatError;
use crate::models::LibraryRecord;

pub const MANIFEST_FILE: &str = "third-party-libraries.json";

/// Parse a manifest document into one record per library.
pub fn parse_manifest(json: &str) -> Result<Vec<LibraryRecord>, ManifestFormatError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a manifest file from disk.
pub fn read_manifest(path: &Path) -> Result<Vec<LibraryRecord>, ManifestFormatError> {
    let content = std::fs::read_to_string(path)?;
    let records = parse_manifest(&content)?;
    tracing::debug!(path = %path.display(), records = records.len(), "read manifest");
    Ok(records)
}

/// Whether a ZIP entry path is the license manifest.
fn is_manifest_entry(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name == MANIFEST_FILE && path.contains("license")
}

/// Locate and read the manifest inside a distribution archive.
pub fn read_manifest_from_zip(archive_path: &Path) -> Result<Vec<LibraryRecord>, ManifestFormatError> {
    let Some((entry, contents)) = archive::read_entry(archive_path, is_manifest_entry)? else {
        return Err(ManifestFormatError::Missing {
            file: MANIFEST_FILE,
            archive: archive_path.to_path_buf(),
        });
    };

    let records: Vec<LibraryRecord> = serde_json::from_slice(&contents)?;
    tracing::info!(
        archive = %archive_path.display(),
        entry = %entry,
        records = records.len(),
        "read license manifest"
    );
    Ok(records)
}
