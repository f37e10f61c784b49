// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{IngestError, SyncError};
use crate::feed::{ChannelDefaults, Document, Enclosure, Entry, load_or_init, save};
use crate::media::{
    AUDIO_MIME_TYPE, MediaInfo, MediaProbe, Relocator, enclosure_url, format_duration,
    title_from_filename,
};
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::state::{
    CandidateFile, MediaInventory, ensure_staging_dir, list_staged_files, scan_publish_dir,
};

/// Author written into new entries unless configured otherwise
pub const DEFAULT_AUTHOR: &str = "My Name";

/// Settings used when turning a staged file into a feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySettings {
    /// Public URL of the publish directory, ending in `/`
    pub base_url: String,
    /// `itunes:author` of new entries
    pub author: Option<String>,
}

/// Options for a publish run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Directory the media files are served from
    pub publish_dir: PathBuf,
    /// Path of the RSS feed file
    pub feed_path: PathBuf,
    /// Directory holding newly uploaded files
    pub staging_dir: PathBuf,
    pub entry: EntrySettings,
    /// Channel fields for a feed created from scratch
    pub channel_defaults: ChannelDefaults,
}

/// Whether a run changed the feed document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Nothing removed, nothing added
    Clean,
    /// The feed was changed and saved; publishing is due
    Dirty,
}

/// An entry dropped because its media file no longer exists
#[derive(Debug, Clone)]
pub struct RemovedEntry {
    pub entry: Entry,
    pub filename: String,
}

/// A staged file that became a feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedEntry {
    pub filename: String,
    pub guid: String,
    pub title: String,
}

/// Result of ingesting a batch of staged files
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Entries added, in processing order
    pub added: Vec<AddedEntry>,
    /// Files left in staging (filename, reason)
    pub skipped: Vec<(String, IngestError)>,
}

/// Result of a publish run
#[derive(Debug)]
pub struct SyncResult {
    pub state: DocumentState,
    pub removed: Vec<RemovedEntry>,
    pub added: Vec<AddedEntry>,
    pub skipped: Vec<(String, IngestError)>,
}

/// Remove every entry whose media file is missing from `inventory`
///
/// Entries without an enclosure are always kept. Survivors keep their
/// relative order. Returns the removed entries in document order.
pub fn reconcile(document: &mut Document, inventory: &MediaInventory) -> Vec<RemovedEntry> {
    let removed = document
        .entries
        .remove_unless(|entry| match referenced_file(entry) {
            Some(filename) => inventory.contains(filename),
            None => true,
        });

    removed
        .into_iter()
        .map(|entry| {
            let filename = referenced_file(&entry).unwrap_or_default().to_string();
            debug!(title = entry.display_title(), %filename, "removing entry with missing media");
            RemovedEntry { entry, filename }
        })
        .collect()
}

fn referenced_file(entry: &Entry) -> Option<&str> {
    entry.media_filename().filter(|filename| !filename.is_empty())
}

/// Turn staged files into entries at the head of the feed
///
/// Candidates are processed in the given order. A candidate is skipped when
/// its GUID is already known (including GUIDs added earlier in this batch) or
/// when its metadata cannot be read. Each new entry is inserted at position 0
/// and its file moved into `publish_dir`. If that move fails the entry is
/// rolled back and the remaining candidates are left in staging.
pub fn ingest<I, P, R>(
    document: &mut Document,
    candidates: I,
    publish_dir: &Path,
    settings: &EntrySettings,
    probe: &P,
    relocator: &R,
    now: DateTime<Utc>,
) -> IngestOutcome
where
    I: IntoIterator<Item = CandidateFile>,
    P: MediaProbe + ?Sized,
    R: Relocator + ?Sized,
{
    let mut known_guids = document.entries.guids();
    let mut outcome = IngestOutcome::default();
    let mut remaining = candidates.into_iter();

    while let Some(candidate) = remaining.next() {
        let guid = candidate.guid().to_string();

        if known_guids.contains(&guid) {
            debug!(filename = %candidate.filename, %guid, "skipping duplicate");
            outcome
                .skipped
                .push((candidate.filename, IngestError::DuplicateGuid { guid }));
            continue;
        }

        let info = match probe.probe(&candidate.path) {
            Ok(info) => info,
            Err(e) => {
                warn!(filename = %candidate.filename, error = %e, "skipping unreadable media");
                outcome.skipped.push((candidate.filename, e.into()));
                continue;
            }
        };

        let entry = new_entry(&candidate, &info, settings, now);
        let title = entry.display_title().to_string();
        document.entries.insert_at_head(entry);
        known_guids.insert(guid.clone());

        let destination = publish_dir.join(&candidate.filename);
        if let Err(e) = relocator.relocate(&candidate.path, &destination) {
            warn!(filename = %candidate.filename, error = %e, "relocation failed, rolling back entry");
            document.entries.remove_head();
            known_guids.remove(&guid);
            outcome.skipped.push((candidate.filename, e.into()));
            outcome.skipped.extend(
                remaining
                    .by_ref()
                    .map(|deferred| (deferred.filename, IngestError::Deferred)),
            );
            break;
        }

        outcome.added.push(AddedEntry {
            filename: candidate.filename,
            guid,
            title,
        });
    }

    outcome
}

/// Build the feed entry for a staged file
pub fn new_entry(
    candidate: &CandidateFile,
    info: &MediaInfo,
    settings: &EntrySettings,
    now: DateTime<Utc>,
) -> Entry {
    let title = title_from_filename(&candidate.filename);

    Entry {
        pub_date: Some(format_timestamp(now)),
        description: Some(format!("Automated upload for: {}", title)),
        guid: Some(candidate.guid().to_string()),
        enclosure: Some(Enclosure {
            url: enclosure_url(&settings.base_url, &candidate.filename),
            length: info.size_bytes,
            mime_type: AUDIO_MIME_TYPE.to_string(),
        }),
        duration: Some(format_duration(info.duration_seconds)),
        author: settings.author.clone(),
        title: Some(title),
        ..Default::default()
    }
}

/// Set the channel's build timestamp, replacing any previous value
pub fn refresh_build_timestamp(document: &mut Document, now: DateTime<Utc>) {
    document.channel.last_build_date = Some(format_timestamp(now));
}

/// Format a timestamp the way RSS expects it (RFC 2822, UTC)
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

/// Run one load → reconcile → ingest → save cycle
///
/// The feed is only written when something changed. Publishing is left to
/// the caller and should happen only for [`DocumentState::Dirty`].
pub fn run_sync<P, R>(
    options: &SyncOptions,
    probe: &P,
    relocator: &R,
    reporter: &SharedProgressReporter,
    now: DateTime<Utc>,
) -> Result<SyncResult, SyncError>
where
    P: MediaProbe + ?Sized,
    R: Relocator + ?Sized,
{
    let initialized = !options.feed_path.exists();
    let mut document = load_or_init(
        &options.feed_path,
        &options.entry.base_url,
        &options.channel_defaults,
    )?;

    reporter.report(ProgressEvent::FeedLoaded {
        title: document.channel.title.clone(),
        entries: document.entries.len(),
        initialized,
    });

    if ensure_staging_dir(&options.staging_dir)? {
        reporter.report(ProgressEvent::StagingCreated {
            path: options.staging_dir.clone(),
        });
    }

    let staging_name = options
        .staging_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let inventory = scan_publish_dir(&options.publish_dir, &staging_name)?;

    let removed = reconcile(&mut document, &inventory);
    for entry in &removed {
        reporter.report(ProgressEvent::EntryRemoved {
            title: entry.entry.display_title().to_string(),
            filename: entry.filename.clone(),
        });
    }

    let candidates = list_staged_files(&options.staging_dir)?;
    let outcome = ingest(
        &mut document,
        candidates,
        &options.publish_dir,
        &options.entry,
        probe,
        relocator,
        now,
    );

    for added in &outcome.added {
        reporter.report(ProgressEvent::EntryAdded {
            title: added.title.clone(),
            guid: added.guid.clone(),
            filename: added.filename.clone(),
        });
    }
    for (filename, reason) in &outcome.skipped {
        reporter.report(ProgressEvent::CandidateSkipped {
            filename: filename.clone(),
            reason: reason.to_string(),
        });
    }

    let state = if removed.is_empty() && outcome.added.is_empty() {
        DocumentState::Clean
    } else {
        DocumentState::Dirty
    };

    match state {
        DocumentState::Dirty => {
            refresh_build_timestamp(&mut document, now);
            save(&document, &options.feed_path)?;
            reporter.report(ProgressEvent::FeedSaved {
                path: options.feed_path.clone(),
                added_count: outcome.added.len(),
                removed_count: removed.len(),
            });
        }
        DocumentState::Clean => reporter.report(ProgressEvent::FeedUnchanged),
    }

    Ok(SyncResult {
        state,
        removed,
        added: outcome.added,
        skipped: outcome.skipped,
    })
}
