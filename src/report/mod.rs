//! Renderers for a resolved license catalog.
//!
//! - [`terminal`]: colored summary and table; respects `--quiet`.
//! - [`render_text`]: the machine-readable forms (`json`, `lines`,
//!   `expression`), all derived from the same catalog.

pub mod terminal;

use anyhow::Result;

use crate::cli::ReportFormat;
use crate::license::catalog::LicenseCatalog;

/// Render a machine-readable report, or `None` for the terminal format.
pub fn render_text(format: &ReportFormat, catalog: &LicenseCatalog) -> Result<Option<String>> {
    let text = match format {
        ReportFormat::Terminal => return Ok(None),
        ReportFormat::Json => format!("{}\n", serde_json::to_string_pretty(&catalog.to_json())?),
        ReportFormat::Lines => catalog.render_lines(),
        ReportFormat::Expression => format!("{}\n", catalog.expression()),
    };
    Ok(Some(text))
}
