//! Locating the CSV payload inside an uploaded archive, and wrapping exported
//! CSV bytes into a downloadable zip.
//!
//! Both container formats share one search policy: an entry whose base name
//! is exactly `data.csv` wins; otherwise the first entry, in archive order,
//! whose base name ends in `.csv` (any case) is used. Archive order is the
//! central directory order for zip and stream order for tar. Candidates are
//! never sorted or merged.

use std::io::{Cursor, Read, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{CatalogError, Result};
use crate::models::ArchiveKind;

/// Name of the preferred entry, and of the single entry in exported archives.
pub const DATA_CSV: &str = "data.csv";

/// Locate the CSV payload in an in-memory archive.
pub fn locate_csv(archive: &[u8], kind: ArchiveKind) -> Result<Vec<u8>> {
    match kind {
        ArchiveKind::Zip => locate_in_zip(archive),
        ArchiveKind::Tar => locate_in_tar(archive),
    }
}

/// Locate the CSV payload in an archive read from `reader`.
///
/// Zip needs random access to its central directory, so the whole payload is
/// buffered first. Tar is scanned as a forward-only stream.
pub fn locate_csv_from_reader<R: Read>(mut reader: R, kind: ArchiveKind) -> Result<Vec<u8>> {
    match kind {
        ArchiveKind::Zip => {
            let mut data = Vec::new();
            reader
                .read_to_end(&mut data)
                .map_err(|e| CatalogError::InvalidArchive(format!("failed to read zip data: {e}")))?;
            locate_in_zip(&data)
        }
        ArchiveKind::Tar => locate_in_tar(reader),
    }
}

fn locate_in_zip(data: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| CatalogError::InvalidArchive(format!("invalid zip archive: {e}")))?;

    // Snapshot the listing first; `by_index` borrows the archive mutably.
    // Raw access reads only the central directory, so entries that are
    // encrypted or use an unsupported method do not block the search.
    let mut names: Vec<(usize, String)> = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let file = archive
            .by_index_raw(i)
            .map_err(|e| CatalogError::InvalidArchive(format!("invalid zip entry {i}: {e}")))?;
        if !file.is_dir() {
            names.push((i, file.name().to_string()));
        }
    }

    let chosen = names
        .iter()
        .find(|(_, name)| base_name(name) == DATA_CSV)
        .or_else(|| names.iter().find(|(_, name)| is_csv_name(base_name(name))));

    let Some((index, name)) = chosen else {
        return Err(CatalogError::CsvNotFound(ArchiveKind::Zip));
    };
    debug!(entry = %name, "selected csv entry from zip");

    let mut file = archive
        .by_index(*index)
        .map_err(|e| CatalogError::InvalidArchive(format!("invalid zip entry {name}: {e}")))?;
    let mut csv = Vec::new();
    file.read_to_end(&mut csv)
        .map_err(|e| CatalogError::InvalidArchive(format!("failed to read {name}: {e}")))?;
    Ok(csv)
}

fn locate_in_tar<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| CatalogError::InvalidArchive(format!("invalid tar archive: {e}")))?;

    let mut fallback: Option<Vec<u8>> = None;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| CatalogError::InvalidArchive(format!("invalid tar archive: {e}")))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let base = base_name(&path);
        if base == DATA_CSV {
            debug!(entry = %path, "selected csv entry from tar");
            return read_tar_entry(&mut entry, &path);
        }
        if fallback.is_none() && is_csv_name(base) {
            debug!(entry = %path, "buffered fallback csv entry from tar");
            fallback = Some(read_tar_entry(&mut entry, &path)?);
        }
    }

    fallback.ok_or(CatalogError::CsvNotFound(ArchiveKind::Tar))
}

fn read_tar_entry<R: Read>(entry: &mut R, path: &str) -> Result<Vec<u8>> {
    let mut csv = Vec::new();
    entry
        .read_to_end(&mut csv)
        .map_err(|e| CatalogError::InvalidArchive(format!("failed to read {path}: {e}")))?;
    Ok(csv)
}

/// Last `/`-separated component of an archive path.
fn base_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

fn is_csv_name(base: &str) -> bool {
    base.to_ascii_lowercase().ends_with(".csv")
}

/// Wrap CSV bytes into a zip holding a single deflated `data.csv` entry.
///
/// The entry timestamp is pinned to the zip epoch so identical input yields
/// identical archives.
pub fn wrap_as_zip(csv: &[u8]) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(DATA_CSV, options).map_err(zip_write_error)?;
    writer.write_all(csv)?;
    let cursor = writer.finish().map_err(zip_write_error)?;
    Ok(cursor.into_inner())
}

fn zip_write_error(e: zip::result::ZipError) -> CatalogError {
    CatalogError::Io(std::io::Error::other(e))
}
