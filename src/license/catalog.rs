use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use serde::Serialize;

use crate::error::UnresolvedLicenseError;
use crate::license::spdx::{is_known_id, resolve};
use crate::models::{LibraryRecord, ResolvedLicense};

/// Deduplicated set of SPDX licenses bundled with an artifact, each with the
/// first license URL seen for it.
///
/// Built by [`aggregate`] or [`LicenseCatalog::parse_lines`]; entries cannot
/// be added afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseCatalog {
    entries: BTreeMap<String, Option<String>>,
}

#[derive(Serialize)]
struct CatalogEntry<'a> {
    id: &'a str,
    url: Option<&'a str>,
}

impl LicenseCatalog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in lexicographic order of their SPDX id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(id, url)| (id.as_str(), url.as_deref()))
    }

    /// All ids joined with `AND`, e.g. `Apache-2.0 AND BSD-3-Clause AND MIT`.
    ///
    /// Every bundled license applies at once; choice between licenses is not
    /// modelled.
    pub fn expression(&self) -> String {
        self.entries
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// One `<id>|<url>` line per entry, url empty when unknown.
    pub fn render_lines(&self) -> String {
        self.iter()
            .map(|(id, url)| format!("{}|{}\n", id, url.unwrap_or_default()))
            .collect()
    }

    /// Read back the output of [`render_lines`](Self::render_lines).
    ///
    /// Every id must be one the label tables resolve to; otherwise the
    /// unknown ids are returned as an [`UnresolvedLicenseError`].
    pub fn parse_lines(text: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut unresolved = BTreeSet::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((id, url)) = line.split_once('|') else {
                bail!("line {}: expected '<spdx-id>|<url>', got '{}'", n + 1, line);
            };
            let id = id.trim();
            if id.is_empty() {
                bail!("line {}: empty SPDX id", n + 1);
            }
            if !is_known_id(id) {
                unresolved.insert(id.to_string());
                continue;
            }
            let url = Some(url.trim()).filter(|u| !u.is_empty()).map(str::to_string);
            entries.entry(id.to_string()).or_insert(url);
        }
        if !unresolved.is_empty() {
            return Err(UnresolvedLicenseError { labels: unresolved }.into());
        }
        Ok(Self { entries })
    }

    /// JSON form: `{"expression": .., "licenses": [{"id": .., "url": ..}]}`.
    pub fn to_json(&self) -> serde_json::Value {
        let licenses: Vec<CatalogEntry<'_>> = self
            .iter()
            .map(|(id, url)| CatalogEntry { id, url })
            .collect();
        serde_json::json!({
            "expression": self.expression(),
            "licenses": licenses,
        })
    }
}

/// Resolve the license of a single record.
///
/// Returns `None` for records without a license label, `Err` with the label
/// as written when it has no mapping.
pub fn resolve_record(record: &LibraryRecord) -> Option<Result<ResolvedLicense, &str>> {
    let label = record.label()?;
    let resolved = match resolve(label) {
        Some(spdx_id) => Ok(ResolvedLicense {
            spdx_id,
            source_url: record
                .license_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        }),
        None => Err(label),
    };
    Some(resolved)
}

/// Build the license catalog for a list of bundled libraries.
///
/// Fails with every distinct unresolved label if any labelled record cannot
/// be mapped; no partial catalog is returned. Records without a label are
/// skipped.
pub fn aggregate(records: &[LibraryRecord]) -> Result<LicenseCatalog, UnresolvedLicenseError> {
    let mut entries: BTreeMap<String, Option<String>> = BTreeMap::new();
    let mut unresolved: BTreeSet<String> = BTreeSet::new();

    for record in records {
        match resolve_record(record) {
            None => {
                tracing::trace!(library = ?record.name, "no license label");
            }
            Some(Ok(license)) => {
                tracing::debug!(
                    library = ?record.name,
                    label = ?record.license_label,
                    spdx = %license.spdx_id,
                    "resolved license"
                );
                entries
                    .entry(license.spdx_id)
                    .or_insert(license.source_url);
            }
            Some(Err(label)) => {
                tracing::warn!(library = ?record.name, label, "unrecognized license label");
                unresolved.insert(label.to_string());
            }
        }
    }

    if !unresolved.is_empty() {
        return Err(UnresolvedLicenseError { labels: unresolved });
    }

    tracing::info!(licenses = entries.len(), records = records.len(), "built license catalog");
    Ok(LicenseCatalog { entries })
}
