// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or saving the RSS feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Feed file {path} is malformed: {reason}")]
    MalformedFeed { path: PathBuf, reason: String },

    #[error("Failed to read feed file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write feed file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize RSS feed: {0}")]
    SerializeFailed(#[from] rss::Error),
}

/// Errors that can occur when reading audio metadata
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to read {path}: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode audio in {path}: {reason}")]
    Undecodable { path: PathBuf, reason: String },
}

/// Errors that can occur when moving a file out of the staging area
#[derive(Error, Debug)]
pub enum RelocateError {
    #[error("Destination {0} already exists")]
    DestinationExists(PathBuf),

    #[error("Failed to move {from} to {to}: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single staged file did not become a feed entry
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("GUID '{guid}' already exists in the feed")]
    DuplicateGuid { guid: String },

    #[error("Unreadable media: {0}")]
    UnreadableMedia(#[from] ProbeError),

    #[error("Relocation failed, entry rolled back: {0}")]
    RelocationFailed(#[from] RelocateError),

    #[error("Not processed after an earlier relocation failure")]
    Deferred,
}

/// Errors that can occur when scanning the publish or staging directory
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while committing and pushing the repository
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("The '{0}' command was not found, is it installed and on PATH?")]
    CommandNotFound(String),

    #[error("Failed to run '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No base URL configured (use --base-url or base_url in the config file)")]
    MissingBaseUrl,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Top-level errors for a sync run
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}
