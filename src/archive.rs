use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use zip::result::ZipResult;
use zip::{ZipArchive, ZipWriter};

/// Read the first file entry whose name satisfies `predicate`.
///
/// Returns the entry's full path inside the archive and its contents.
pub fn read_entry(
    archive_path: &Path,
    mut predicate: impl FnMut(&str) -> bool,
) -> ZipResult<Option<(String, Vec<u8>)>> {
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || !predicate(entry.name()) {
            continue;
        }
        let name = entry.name().to_string();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        return Ok(Some((name, contents)));
    }

    Ok(None)
}

/// Strip the leading directory from an entry path.
///
/// `MPS-2024.1/bin/mps.sh` becomes `bin/mps.sh`; a path without `/` is kept.
fn flatten_path(name: &str) -> &str {
    name.split_once('/').map_or(name, |(_, rest)| rest)
}

/// Copy `src` to `dest` with the single top-level directory removed from
/// every entry path. Directory entries are dropped and file data is copied
/// without recompression. Returns the number of files written.
pub fn repackage(src: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(src).with_context(|| format!("opening {}", src.display()))?;
    let mut archive =
        ZipArchive::new(file).with_context(|| format!("reading archive {}", src.display()))?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let partial = dest.with_extension("zip.part");
    let mut writer = ZipWriter::new(File::create(&partial)?);
    let mut seen: HashSet<String> = HashSet::new();
    let mut written = 0;

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if entry.is_dir() {
            continue;
        }
        let flattened = flatten_path(entry.name()).to_string();
        if flattened.is_empty() {
            continue;
        }
        if !seen.insert(flattened.clone()) {
            tracing::warn!(entry = entry.name(), path = %flattened, "duplicate path after flattening, keeping first");
            continue;
        }
        writer
            .raw_copy_file_rename(entry, flattened)
            .with_context(|| format!("copying entry {i} of {}", src.display()))?;
        written += 1;
    }

    writer.finish()?;
    fs::rename(&partial, dest)?;

    tracing::info!(files = written, dest = %dest.display(), "repackaged archive");
    Ok(written)
}

#[cfg(test)]
pub(crate) fn write_test_zip(path: &Path, entries: &[(&str, &str)]) {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap();
}
