//! Per-variant zip bundles.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tracing::info;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ExportError, Result};
use crate::model::Variant;

pub fn archive_path(outdir: &Path, variant: Variant) -> PathBuf {
    outdir.join(format!("{}.zip", variant.short_name()))
}

/// Zip `files` into `<outdir>/<short>.zip`, each stored under its bare file
/// name. Returns the archive path.
pub fn archive(outdir: &Path, variant: Variant, files: &[PathBuf]) -> Result<PathBuf> {
    let path = archive_path(outdir, variant);
    write_archive(&path, files).map_err(ExportError::archive(&path))?;
    info!(variant = %variant, path = %path.display(), entries = files.len(), "archive written");
    Ok(path)
}

fn write_archive(path: &Path, files: &[PathBuf]) -> std::result::Result<(), ZipError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(File::create(path)?);
    for file in files {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ZipError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("not a file name: {}", file.display()),
                ))
            })?;
        zip.start_file(name, options)?;
        let mut reader = BufReader::new(File::open(file)?);
        io::copy(&mut reader, &mut zip)?;
    }
    zip.finish()?;
    Ok(())
}
