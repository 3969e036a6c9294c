use std::collections::HashMap;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::error::UnresolvedLicenseError;
use crate::license::catalog::{resolve_record, LicenseCatalog};
use crate::license::exception::exception_labels;
use crate::license::spdx::license_labels;
use crate::models::LibraryRecord;

/// Number of libraries per resolved SPDX id.
fn library_counts(records: &[LibraryRecord]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for record in records {
        if let Some(Ok(license)) = resolve_record(record) {
            *counts.entry(license.spdx_id).or_insert(0) += 1;
        }
    }
    counts
}

fn header(source: &str) {
    println!(
        "\n {} v{}",
        "mps-prerelease-publish".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Manifest: {}\n", source);
}

/// Render a colored summary and license table.
pub fn render(catalog: &LicenseCatalog, records: &[LibraryRecord], source: &str, quiet: bool) {
    let labelled = records.iter().filter(|r| r.label().is_some()).count();

    if quiet {
        println!(
            "Libraries: {}  Labelled: {}  Licenses: {}",
            records.len(),
            labelled,
            catalog.len().to_string().green()
        );
        return;
    }

    header(source);

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Libraries          : {}", records.len()));
    println!(" │  {:<48} │", format!("With license label : {}", labelled));
    println!(" │  {:<48} │", format!("Distinct licenses  : {}", catalog.len()));
    println!(" └────────────────────────────────────────────────────┘\n");

    if catalog.is_empty() {
        println!(" {} No licensed libraries found.\n", "[INFO]".cyan().bold());
        return;
    }

    let counts = library_counts(records);
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("SPDX").add_attribute(Attribute::Bold),
            Cell::new("Libraries").add_attribute(Attribute::Bold),
            Cell::new("URL").add_attribute(Attribute::Bold),
        ]);

    for (id, url) in catalog.iter() {
        let color = if id.contains(" WITH ") {
            Color::Yellow
        } else {
            Color::Green
        };
        table.add_row(vec![
            Cell::new(id).fg(color),
            Cell::new(counts.get(id).copied().unwrap_or(0)).set_alignment(CellAlignment::Right),
            Cell::new(url.unwrap_or("-")).fg(if url.is_some() {
                Color::Reset
            } else {
                Color::DarkGrey
            }),
        ]);
    }

    println!("{}", table);
    println!("\n {} {}\n", "Expression:".bold(), catalog.expression());
}

/// One-line form for `--quiet`: the count followed by every label.
fn unresolved_summary(err: &UnresolvedLicenseError) -> String {
    format!("Unresolved: {} ({})", err.labels.len(), err)
}

/// Render the labels that blocked the catalog, one per line.
///
/// With `quiet` the labels are still listed, on a single stderr line.
pub fn render_unresolved(err: &UnresolvedLicenseError, source: &str, quiet: bool) {
    if quiet {
        eprintln!("{}", unresolved_summary(err).red());
        return;
    }

    header(source);
    println!(
        " {} {} license label(s) have no SPDX mapping:\n",
        "[ERROR]".red().bold(),
        err.labels.len()
    );
    for label in &err.labels {
        println!("   {} {:?}", "✗".red(), label);
    }
    println!("\n Add the spelling to the label table before publishing.\n");
}

fn label_table(title: &str, rows: &[(&str, &str)]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new(title).add_attribute(Attribute::Bold),
            Cell::new("SPDX").add_attribute(Attribute::Bold),
        ]);
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)));
    for (label, id) in sorted {
        table.add_row(vec![Cell::new(label), Cell::new(id).fg(Color::Green)]);
    }
    table
}

/// Print every known license and exception spelling, grouped by SPDX id.
pub fn render_labels() {
    println!("{}", label_table("License label", license_labels()));
    println!();
    println!("{}", label_table("Exception label", exception_labels()));
    println!(
        "\n Compound labels are written `<license> + <exception>`, e.g. `GPL 2.0 + Classpath`.\n"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_counts_group_by_resolved_id() {
        let records: Vec<LibraryRecord> = ["MIT", "MIT License", "Apache 2.0", "bogus"]
            .iter()
            .map(|l| LibraryRecord {
                license_label: Some(l.to_string()),
                ..Default::default()
            })
            .collect();
        let counts = library_counts(&records);
        assert_eq!(counts.get("MIT"), Some(&2));
        assert_eq!(counts.get("Apache-2.0"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_quiet_summary_lists_every_label() {
        let err = UnresolvedLicenseError {
            labels: ["zzz", "GPL 2.0 + Nope", "aaa"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };
        let line = unresolved_summary(&err);
        assert!(line.starts_with("Unresolved: 3 ("));
        assert!(line.contains("'GPL 2.0 + Nope', 'aaa', 'zzz'"));
    }
}
