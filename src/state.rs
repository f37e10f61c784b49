// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::InventoryError;
use crate::media::{derive_guid, is_media_file};

/// Media filenames present in the publish directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaInventory {
    filenames: HashSet<String>,
}

impl MediaInventory {
    pub fn contains(&self, filename: &str) -> bool {
        self.filenames.contains(filename)
    }

    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MediaInventory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            filenames: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A staged media file waiting to be published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Filename without path
    pub filename: String,
    /// Full path inside the staging directory
    pub path: PathBuf,
}

impl CandidateFile {
    pub fn new(staging_dir: &Path, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            path: staging_dir.join(&filename),
            filename,
        }
    }

    /// GUID this file will be published under
    pub fn guid(&self) -> &str {
        derive_guid(&self.filename)
    }
}

/// Create the staging directory if it does not exist yet
///
/// Returns `true` if the directory was created.
pub fn ensure_staging_dir(staging_dir: &Path) -> Result<bool, InventoryError> {
    if staging_dir.is_dir() {
        return Ok(false);
    }

    std::fs::create_dir_all(staging_dir).map_err(|e| InventoryError::CreateDirectoryFailed {
        path: staging_dir.to_path_buf(),
        source: e,
    })?;

    debug!(path = %staging_dir.display(), "created staging directory");
    Ok(true)
}

/// Scan the publish directory for media files
///
/// Only regular files with the media extension count; the staging
/// directory is never part of the inventory.
pub fn scan_publish_dir(
    publish_dir: &Path,
    staging_dir_name: &str,
) -> Result<MediaInventory, InventoryError> {
    let filenames = media_files_in(publish_dir)?
        .into_iter()
        .filter(|filename| filename != staging_dir_name)
        .collect::<HashSet<_>>();

    debug!(path = %publish_dir.display(), count = filenames.len(), "scanned publish directory");
    Ok(MediaInventory { filenames })
}

/// List media files waiting in the staging directory, in directory listing order
pub fn list_staged_files(staging_dir: &Path) -> Result<Vec<CandidateFile>, InventoryError> {
    let candidates: Vec<_> = media_files_in(staging_dir)?
        .into_iter()
        .map(|filename| CandidateFile::new(staging_dir, filename))
        .collect();

    debug!(path = %staging_dir.display(), count = candidates.len(), "listed staged files");
    Ok(candidates)
}

fn media_files_in(dir: &Path) -> Result<Vec<String>, InventoryError> {
    let read_failed = |e: std::io::Error| InventoryError::ReadDirectoryFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut filenames = Vec::new();

    for entry in std::fs::read_dir(dir).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;

        if entry.file_type().map_err(read_failed)?.is_dir() {
            continue;
        }

        let Some(filename) = entry.file_name().to_str().map(String::from) else {
            warn!(
                dir = %dir.display(),
                filename = %entry.file_name().to_string_lossy(),
                "skipping file with a name that is not valid UTF-8"
            );
            continue;
        };

        if is_media_file(&filename) {
            filenames.push(filename);
        }
    }

    Ok(filenames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_staging_dir_creates_missing_dir() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("_new_uploads");

        assert!(ensure_staging_dir(&staging).unwrap());
        assert!(staging.is_dir());
    }

    #[test]
    fn ensure_staging_dir_keeps_existing_dir() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("_new_uploads");
        std::fs::create_dir(&staging).unwrap();
        std::fs::write(staging.join("1_a.mp3"), b"audio").unwrap();

        assert!(!ensure_staging_dir(&staging).unwrap());
        assert!(staging.join("1_a.mp3").exists());
    }

    #[test]
    fn scan_finds_media_files_case_insensitively() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("B.MP3"), b"").unwrap();
        std::fs::write(dir.path().join("feed.xml"), b"").unwrap();

        let inventory = scan_publish_dir(dir.path(), "_new_uploads").unwrap();

        assert_eq!(inventory.len(), 2);
        assert!(inventory.contains("a.mp3"));
        assert!(inventory.contains("B.MP3"));
        assert!(!inventory.contains("feed.xml"));
    }

    #[test]
    fn scan_skips_staging_dir_and_its_contents() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("_new_uploads");
        std::fs::create_dir(&staging).unwrap();
        std::fs::write(staging.join("1_staged.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("published.mp3"), b"").unwrap();

        let inventory = scan_publish_dir(dir.path(), "_new_uploads").unwrap();

        assert_eq!(inventory.len(), 1);
        assert!(inventory.contains("published.mp3"));
    }

    #[test]
    fn scan_skips_directories_named_like_media() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("folder.mp3")).unwrap();

        let inventory = scan_publish_dir(dir.path(), "_new_uploads").unwrap();

        assert!(inventory.is_empty());
    }

    #[test]
    fn scan_fails_for_missing_dir() {
        let dir = tempdir().unwrap();
        let result = scan_publish_dir(&dir.path().join("missing"), "_new_uploads");

        assert!(matches!(
            result,
            Err(InventoryError::ReadDirectoryFailed { .. })
        ));
    }

    #[test]
    fn list_staged_returns_candidates_with_paths() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("104_British_History.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"").unwrap();

        let candidates = list_staged_files(dir.path()).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].filename, "104_British_History.mp3");
        assert_eq!(candidates[0].path, dir.path().join("104_British_History.mp3"));
        assert_eq!(candidates[0].guid(), "104");
    }

    #[test]
    fn inventory_collects_from_strings() {
        let inventory: MediaInventory = ["a.mp3", "b.mp3"].into_iter().collect();

        assert!(inventory.contains("a.mp3"));
        assert!(!inventory.contains("c.mp3"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn list_staged_skips_non_utf8_names_and_keeps_going() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"7_Bad\xff.mp3")), b"").unwrap();
        std::fs::write(dir.path().join("8_Good.mp3"), b"").unwrap();

        let candidates = list_staged_files(dir.path()).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].filename, "8_Good.mp3");
    }
}
