// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration file parser for `podpub.toml`.
//!
//! The file is optional and every key has a default except `base_url`,
//! which may also come from the command line.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::feed::{ChannelDefaults, DEFAULT_LANGUAGE};
use crate::publish::PublishOptions;
use crate::sync::{DEFAULT_AUTHOR, EntrySettings, SyncOptions};

/// Name of the config file looked up in the repository directory
pub const CONFIG_FILENAME: &str = "podpub.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Public URL the repository is served from
    pub base_url: Option<String>,
    /// Feed filename, relative to the repository
    pub feed_file: String,
    /// Staging directory name, relative to the repository
    pub staging_dir: String,
    pub channel_title: String,
    pub channel_description: String,
    pub language: String,
    /// `itunes:author` of new entries, empty to omit
    pub author: String,
    pub remote: String,
    pub branch: String,
    pub commit_message: String,
}

impl Default for Config {
    fn default() -> Self {
        let channel = ChannelDefaults::default();
        let publish = PublishOptions::default();

        Self {
            base_url: None,
            feed_file: "feed.xml".to_string(),
            staging_dir: "_new_uploads".to_string(),
            channel_title: channel.title,
            channel_description: channel.description,
            language: DEFAULT_LANGUAGE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            remote: publish.remote,
            branch: publish.branch,
            commit_message: publish.commit_message,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::ReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Validated base URL, always ending in `/`
    pub fn base_url(&self) -> Result<String, ConfigError> {
        let raw = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query strings and fragments are not allowed".to_string()));
        }

        let mut normalized = url.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        Ok(normalized)
    }

    /// Options for a run against the repository at `repo_dir`
    pub fn sync_options(&self, repo_dir: &Path) -> Result<SyncOptions, ConfigError> {
        let author = Some(self.author.trim().to_string()).filter(|author| !author.is_empty());

        Ok(SyncOptions {
            publish_dir: repo_dir.to_path_buf(),
            feed_path: repo_dir.join(&self.feed_file),
            staging_dir: repo_dir.join(&self.staging_dir),
            entry: EntrySettings {
                base_url: self.base_url()?,
                author,
            },
            channel_defaults: ChannelDefaults {
                title: self.channel_title.clone(),
                description: self.channel_description.clone(),
                language: self.language.clone(),
            },
        })
    }

    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            commit_message: self.commit_message.clone(),
            remote: self.remote.clone(),
            branch: self.branch.clone(),
        }
    }
}

/// Default config path for a repository
pub fn default_config_path(repo_dir: &Path) -> PathBuf {
    repo_dir.join(CONFIG_FILENAME)
}
