// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::RelocateError;

/// File move abstraction for testability
pub trait Relocator {
    /// Move `from` to `to`, never overwriting an existing file
    fn relocate(&self, from: &Path, to: &Path) -> Result<(), RelocateError>;
}

/// Default relocator using the local filesystem
///
/// Tries a rename first and falls back to copy + remove when the staging
/// area lives on a different filesystem than the publish directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsRelocator;

impl Relocator for FsRelocator {
    fn relocate(&self, from: &Path, to: &Path) -> Result<(), RelocateError> {
        if to.exists() {
            return Err(RelocateError::DestinationExists(to.to_path_buf()));
        }

        let move_failed = |e: std::io::Error| RelocateError::MoveFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e,
        };

        match std::fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                debug!(from = %from.display(), to = %to.display(), error = %rename_err, "rename failed, copying instead");
                if !from.exists() {
                    return Err(move_failed(rename_err));
                }
                move_by_copy(from, to, |p| std::fs::remove_file(p)).map_err(move_failed)
            }
        }
    }
}

/// Copy `from` to `to` and remove the source
///
/// On failure the destination is removed again, so a failed move never
/// leaves a partial or duplicate file behind in the publish directory.
fn move_by_copy<F>(from: &Path, to: &Path, remove_source: F) -> std::io::Result<()>
where
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    let result = std::fs::copy(from, to).and_then(|_| remove_source(from));

    if result.is_err()
        && to.exists()
        && let Err(cleanup_err) = std::fs::remove_file(to)
    {
        warn!(path = %to.display(), error = %cleanup_err, "failed to remove destination after failed move");
    }

    result
}
