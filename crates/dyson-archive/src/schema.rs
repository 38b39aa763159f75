//! Archive header: format tag and version.
//!
//! Every archive file starts with a `format` string and a `version` number.
//! Reading checks both before the arrays are trusted.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::record::Archive;

/// Format tag written into every archive file.
pub(crate) const FORMAT_TAG: &str = "DysonArchive";

/// Current on-disk version.
pub(crate) const FORMAT_VERSION: i64 = 1;

/// On-disk representation of an archive.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ArchiveFile {
    pub(crate) format: String,
    pub(crate) version: i64,
    pub(crate) archive: Archive,
}

impl ArchiveFile {
    pub(crate) fn wrap(archive: Archive) -> Self {
        Self {
            format: FORMAT_TAG.to_string(),
            version: FORMAT_VERSION,
            archive,
        }
    }
}

/// Check the format tag and version of a decoded file.
///
/// Returns the version number on success, or an error if:
/// - The tag doesn't match `expected_format`
/// - The version exceeds `max_version`
pub(crate) fn require_format_version(
    file: &ArchiveFile,
    expected_format: &str,
    max_version: i64,
) -> Result<i64> {
    if file.format != expected_format {
        bail!(
            "Expected archive format '{}', found '{}'",
            expected_format,
            file.format
        );
    }
    if file.version > max_version {
        bail!(
            "Unsupported {} version {} (max supported: {})",
            expected_format,
            file.version,
            max_version
        );
    }
    Ok(file.version)
}
