//! The zip container around a deck's collection database and media.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Result, StoreError};

/// Extract every file entry of `archive` into `into`.
/// Returns the entry names in archive order.
pub fn unpack(archive: &Path, into: &Path) -> Result<Vec<String>> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)?;
    let mut names = Vec::with_capacity(zip.len());

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(rel) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!("skipping unsafe archive entry '{}'", entry.name());
            continue;
        };
        let target = into.join(&rel);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        names.push(entry.name().to_string());
    }

    tracing::debug!("unpacked {} entries from {}", names.len(), archive.display());
    Ok(names)
}

/// File names directly inside an already unpacked deck directory, sorted.
/// SQLite side files (journals, WAL) are not part of a deck.
pub fn list_entries(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_sqlite_side_file(&name) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

/// Copy every file directly inside `dir` into `into`, SQLite side files
/// included so a pending WAL travels with its database.
pub fn copy_files(dir: &Path, into: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        fs::copy(entry.path(), into.join(entry.file_name()))?;
        copied += 1;
    }
    tracing::debug!("copied {copied} files from {}", dir.display());
    Ok(copied)
}

fn is_sqlite_side_file(name: &str) -> bool {
    ["-journal", "-wal", "-shm"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

/// Zip `entries` (relative to `dir`) into `output`.
///
/// Written to a sibling temp file first and renamed into place, so a failed
/// write never leaves a truncated archive at `output`.
pub fn pack(dir: &Path, entries: &[String], output: &Path, overwrite: bool) -> Result<()> {
    if output.exists() && !overwrite {
        return Err(StoreError::OutputExists(output.to_path_buf()));
    }

    let tmp = temp_sibling(output);
    let result = write_zip(dir, entries, &tmp);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
        return result;
    }
    fs::rename(&tmp, output)?;
    tracing::info!("wrote {} ({} entries)", output.display(), entries.len());
    Ok(())
}

fn write_zip(dir: &Path, entries: &[String], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for name in entries {
        zip.start_file(name.as_str(), options)?;
        let mut source = File::open(dir.join(name))?;
        io::copy(&mut source, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}

fn temp_sibling(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    output.with_file_name(name)
}
