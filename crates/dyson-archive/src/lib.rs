//! Named complex-array archives.
//!
//! An archive is a file holding an ordered map `name -> array`, where every
//! array is a dense row-major `Complex64` buffer with its shape. Weights are
//! stored under `"{quantity}.SmoothT"` / `"{quantity}.DeltaT"` keys, so several
//! quantities can share one file.
//!
//! # Save modes
//!
//! - [`SaveMode::Overwrite`] replaces the file with exactly the given arrays.
//! - [`SaveMode::Append`] keeps every array already in the file that is not
//!   being written again, byte for byte.
//!
//! # Example
//!
//! ```no_run
//! use dyson_archive::{load_archive, save_archive, Archive, ArrayRecord, SaveMode};
//! use num_complex::Complex64;
//!
//! let mut archive = Archive::new();
//! let record = ArrayRecord::new(vec![2], vec![Complex64::new(1.0, 0.0); 2]).unwrap();
//! archive.insert("G.DeltaT", record);
//! save_archive("GW.dat", &archive, SaveMode::Append).unwrap();
//!
//! let loaded = load_archive("GW.dat").unwrap();
//! assert!(loaded.contains("G.DeltaT"));
//! ```

mod record;
mod schema;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;

pub use record::{Archive, ArrayRecord};

use schema::{require_format_version, ArchiveFile, FORMAT_TAG, FORMAT_VERSION};

/// How [`save_archive`] treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveMode {
    /// Replace the file.
    Overwrite,
    /// Merge into the existing file; arrays not being written are preserved.
    #[default]
    Append,
}

/// Read every array of an archive file.
pub fn load_archive(path: impl AsRef<Path>) -> Result<Archive> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("{} fails to read!", path.display()))?;
    let decoded: ArchiveFile = bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("{} is not a readable archive", path.display()))?;
    require_format_version(&decoded, FORMAT_TAG, FORMAT_VERSION)?;

    for (name, record) in decoded.archive.iter() {
        record
            .validate()
            .with_context(|| format!("array '{}' in {}", name, path.display()))?;
    }
    debug!(path = %path.display(), arrays = decoded.archive.len(), "loaded archive");
    Ok(decoded.archive)
}

/// Write arrays to an archive file.
///
/// In [`SaveMode::Append`] an existing file is read first and its arrays are
/// kept unless `archive` holds an array of the same name. The file is only
/// replaced once the new contents are fully written.
pub fn save_archive(path: impl AsRef<Path>, archive: &Archive, mode: SaveMode) -> Result<()> {
    let path = path.as_ref();

    let mut merged = match mode {
        SaveMode::Append if path.exists() => load_archive(path)?,
        _ => Archive::new(),
    };
    merged.merge(archive.clone());

    let file = ArchiveFile::wrap(merged);
    write_atomically(path, |writer| {
        bincode::serialize_into(writer, &file)
            .with_context(|| format!("failed to encode archive {}", path.display()))
    })?;

    debug!(path = %path.display(), ?mode, arrays = archive.len(), "saved archive");
    Ok(())
}

/// Write through a temporary file next to `path`, then rename it over `path`.
///
/// If `write` fails the temporary file is removed and `path` is untouched.
fn write_atomically(
    path: &Path,
    write: impl FnOnce(&mut dyn Write) -> Result<()>,
) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("{} fails to open for writing", path.display()))?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("failed to write archive {}", path.display()))?;
    }
    temp.as_file()
        .sync_all()
        .with_context(|| format!("failed to write archive {}", path.display()))?;
    temp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}
