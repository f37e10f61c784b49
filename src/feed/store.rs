// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FeedError;
use crate::media::enclosure_url;

use super::document::{Channel, Document};

/// Language written into a freshly created channel
pub const DEFAULT_LANGUAGE: &str = "en-us";

const INDENT_SIZE: usize = 2;

/// Channel fields used when no feed file exists yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDefaults {
    pub title: String,
    pub description: String,
    pub language: String,
}

impl Default for ChannelDefaults {
    fn default() -> Self {
        Self {
            title: "My Private History Audio Feed".to_string(),
            description: "My personal audio collection.".to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Load the feed at `path`, or create a fresh document if the file does not exist
///
/// A fresh document links to `base_url` and carries a self link pointing at
/// `base_url` + the feed's filename.
pub fn load_or_init(
    path: &Path,
    base_url: &str,
    defaults: &ChannelDefaults,
) -> Result<Document, FeedError> {
    if !path.exists() {
        debug!(path = %path.display(), "feed file not found, creating a new document");
        return Ok(init_document(path, base_url, defaults));
    }

    let bytes = std::fs::read(path).map_err(|e| FeedError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let channel = rss::Channel::read_from(&bytes[..]).map_err(|e| FeedError::MalformedFeed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let document = Document::from_rss(&channel);
    debug!(path = %path.display(), entries = document.entries.len(), "loaded feed");
    Ok(document)
}

fn init_document(path: &Path, base_url: &str, defaults: &ChannelDefaults) -> Document {
    let feed_filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut channel = Channel::new(&defaults.title, base_url, &defaults.description);
    channel.language = Some(defaults.language.clone());
    channel.self_link = Some(enclosure_url(base_url, &feed_filename));

    Document::new(channel)
}

/// Serialize the document and atomically replace the feed file
///
/// The XML is indented, contains no blank lines and is written to a
/// `.partial` sibling first, so the feed file is never left half written.
pub fn save(document: &Document, path: &Path) -> Result<(), FeedError> {
    let xml = render(document)?;
    let partial_path = partial_path(path);

    std::fs::write(&partial_path, xml).map_err(|e| FeedError::WriteFailed {
        path: partial_path.clone(),
        source: e,
    })?;

    std::fs::rename(&partial_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&partial_path);
        FeedError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    debug!(path = %path.display(), entries = document.entries.len(), "saved feed");
    Ok(())
}

/// Render the document as indented XML
pub fn render(document: &Document) -> Result<String, FeedError> {
    let channel = document.to_rss();
    let buffer = channel.pretty_write_to(Vec::new(), b' ', INDENT_SIZE)?;

    let mut xml = String::with_capacity(buffer.len());
    for line in String::from_utf8_lossy(&buffer).lines() {
        if !line.trim().is_empty() {
            xml.push_str(line);
            xml.push('\n');
        }
    }

    Ok(xml)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}
