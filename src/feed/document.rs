// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;

use rss::extension::atom::{self, Link};
use rss::extension::itunes::{self, ITunesItemExtension};

/// The feed's single channel record
///
/// Only the fields the publisher maintains are modelled. Other RSS elements
/// and namespaced extensions the persisted channel carries are kept in `raw`
/// and written back unchanged. Unknown elements without a namespace are not
/// understood by the parser and get lost on save.
#[derive(Debug, Clone, Default)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: Option<String>,
    /// `atom:link rel="self"` target
    pub self_link: Option<String>,
    /// RFC 2822 timestamp of the last rebuild
    pub last_build_date: Option<String>,
    raw: rss::Channel,
}

/// The downloadable media attached to an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enclosure {
    pub url: String,
    pub length: u64,
    pub mime_type: String,
}

/// One published episode
#[derive(Debug, Clone, Default)]
pub struct Entry {
    pub title: Option<String>,
    /// RFC 2822 timestamp, fixed at creation
    pub pub_date: Option<String>,
    pub description: Option<String>,
    pub guid: Option<String>,
    pub enclosure: Option<Enclosure>,
    /// `itunes:duration`
    pub duration: Option<String>,
    /// `itunes:author`
    pub author: Option<String>,
    pub(crate) raw: Option<rss::Item>,
}

/// Ordered entries, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryList {
    entries: Vec<Entry>,
}

/// A loaded feed: one channel plus its entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub channel: Channel,
    pub entries: EntryList,
}

impl Channel {
    /// Create a channel with the given required fields and nothing else
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    fn from_rss(channel: &rss::Channel) -> Self {
        let self_link = channel.atom_ext().and_then(|ext| {
            ext.links()
                .iter()
                .find(|link| link.rel() == "self")
                .map(|link| link.href().to_string())
        });

        let mut raw = channel.clone();
        raw.set_items(Vec::new());

        Self {
            title: channel.title().to_string(),
            link: channel.link().to_string(),
            description: channel.description().to_string(),
            language: channel.language().map(String::from),
            self_link,
            last_build_date: channel.last_build_date().map(String::from),
            raw,
        }
    }

    fn to_rss(&self) -> rss::Channel {
        let mut channel = self.raw.clone();
        channel.set_title(self.title.clone());
        channel.set_link(self.link.clone());
        channel.set_description(self.description.clone());
        channel.set_language(self.language.clone());
        channel.set_last_build_date(self.last_build_date.clone());

        let mut namespaces = channel.namespaces().clone();
        namespaces.insert("itunes".to_string(), itunes::NAMESPACE.to_string());

        if let Some(href) = &self.self_link {
            namespaces.insert("atom".to_string(), atom::NAMESPACE.to_string());

            let mut ext = channel.atom_ext().cloned().unwrap_or_default();
            let mut links: Vec<Link> = ext
                .links()
                .iter()
                .filter(|link| link.rel() != "self")
                .cloned()
                .collect();
            links.insert(0, self_link(href));
            ext.set_links(links);
            channel.set_atom_ext(Some(ext));
        }

        channel.set_namespaces(namespaces);
        channel
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.link == other.link
            && self.description == other.description
            && self.language == other.language
            && self.self_link == other.self_link
            && self.last_build_date == other.last_build_date
    }
}

fn self_link(href: &str) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel("self");
    link.set_mime_type(Some("application/rss+xml".to_string()));
    link
}

impl Entry {
    /// Name of the media file this entry points at, if it has an enclosure
    pub fn media_filename(&self) -> Option<&str> {
        self.enclosure
            .as_ref()
            .map(|enclosure| crate::media::extract_filename(&enclosure.url))
    }

    /// Title for display, falling back to a placeholder
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    fn from_item(item: &rss::Item) -> Self {
        let itunes = item.itunes_ext();

        Self {
            title: item.title().map(String::from),
            pub_date: item.pub_date().map(String::from),
            description: item.description().map(String::from),
            guid: item.guid().map(|guid| guid.value().to_string()),
            enclosure: item.enclosure().map(|enclosure| Enclosure {
                url: enclosure.url().to_string(),
                length: enclosure.length().trim().parse().unwrap_or(0),
                mime_type: enclosure.mime_type().to_string(),
            }),
            duration: itunes.and_then(|ext| ext.duration().map(String::from)),
            author: itunes.and_then(|ext| ext.author().map(String::from)),
            raw: Some(item.clone()),
        }
    }

    fn to_item(&self) -> rss::Item {
        let mut item = self.raw.clone().unwrap_or_default();
        item.set_title(self.title.clone());
        item.set_pub_date(self.pub_date.clone());
        item.set_description(self.description.clone());

        let guid = self.guid.as_ref().map(|value| {
            let mut guid = item.guid().cloned().unwrap_or_else(|| {
                let mut fresh = rss::Guid::default();
                fresh.set_permalink(false);
                fresh
            });
            guid.set_value(value.clone());
            guid
        });
        item.set_guid(guid);

        let enclosure = self.enclosure.as_ref().map(|source| {
            let mut enclosure = item.enclosure().cloned().unwrap_or_default();
            enclosure.set_url(source.url.clone());
            enclosure.set_length(source.length.to_string());
            enclosure.set_mime_type(source.mime_type.clone());
            enclosure
        });
        item.set_enclosure(enclosure);

        if self.duration.is_some() || self.author.is_some() || item.itunes_ext().is_some() {
            let mut ext: ITunesItemExtension = item.itunes_ext().cloned().unwrap_or_default();
            ext.set_duration(self.duration.clone());
            ext.set_author(self.author.clone());
            item.set_itunes_ext(Some(ext));
        }

        item
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.pub_date == other.pub_date
            && self.description == other.description
            && self.guid == other.guid
            && self.enclosure == other.enclosure
            && self.duration == other.duration
            && self.author == other.author
    }
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Insert an entry before all others
    pub fn insert_at_head(&mut self, entry: Entry) {
        self.entries.insert(0, entry);
    }

    /// Remove and return the first entry
    pub fn remove_head(&mut self) -> Option<Entry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    /// Remove every entry for which `keep` returns false
    ///
    /// Survivors and removed entries both keep their relative order.
    pub fn remove_unless<F>(&mut self, keep: F) -> Vec<Entry>
    where
        F: FnMut(&Entry) -> bool,
    {
        let (kept, removed): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(keep);
        self.entries = kept;
        removed
    }

    /// All GUID values currently present
    pub fn guids(&self) -> HashSet<String> {
        self.entries
            .iter()
            .filter_map(|entry| entry.guid.clone())
            .collect()
    }
}

impl FromIterator<Entry> for EntryList {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Document {
    /// Create a document with the given channel and no entries
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            entries: EntryList::new(),
        }
    }

    /// Build a document from a parsed RSS channel
    pub fn from_rss(channel: &rss::Channel) -> Self {
        Self {
            channel: Channel::from_rss(channel),
            entries: channel.items().iter().map(Entry::from_item).collect(),
        }
    }

    /// Convert back to an RSS channel ready for serialization
    pub fn to_rss(&self) -> rss::Channel {
        let mut channel = self.channel.to_rss();
        channel.set_items(self.entries.iter().map(Entry::to_item).collect::<Vec<_>>());
        channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Test Podcast</title>
    <link>https://example.com/pod/</link>
    <description>A test podcast</description>
    <language>en-us</language>
    <lastBuildDate>Mon, 01 Jan 2024 12:00:00 +0000</lastBuildDate>
    <image>
      <url>https://example.com/pod/cover.jpg</url>
      <title>Test Podcast</title>
      <link>https://example.com/pod/</link>
    </image>
    <atom:link href="https://example.com/pod/feed.xml" rel="self" type="application/rss+xml"/>
    <item>
      <title>104 British History</title>
      <pubDate>Mon, 01 Jan 2024 12:00:00 +0000</pubDate>
      <description>Automated upload for: 104 British History</description>
      <guid isPermaLink="false">104</guid>
      <enclosure url="https://example.com/pod/104_British_History.mp3" length="1000" type="audio/mpeg"/>
      <itunes:duration>1:05</itunes:duration>
      <itunes:author>Someone</itunes:author>
    </item>
    <item>
      <title>Hand written</title>
      <link>https://example.com/notes</link>
    </item>
  </channel>
</rss>"#;

    fn parse(xml: &str) -> Document {
        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        Document::from_rss(&channel)
    }

    #[test]
    fn from_rss_extracts_channel_fields() {
        let doc = parse(SAMPLE_FEED);

        assert_eq!(doc.channel.title, "Test Podcast");
        assert_eq!(doc.channel.link, "https://example.com/pod/");
        assert_eq!(doc.channel.description, "A test podcast");
        assert_eq!(doc.channel.language.as_deref(), Some("en-us"));
        assert_eq!(
            doc.channel.self_link.as_deref(),
            Some("https://example.com/pod/feed.xml")
        );
        assert_eq!(
            doc.channel.last_build_date.as_deref(),
            Some("Mon, 01 Jan 2024 12:00:00 +0000")
        );
    }

    #[test]
    fn from_rss_extracts_entries_in_order() {
        let doc = parse(SAMPLE_FEED);

        assert_eq!(doc.entries.len(), 2);

        let first = doc.entries.get(0).unwrap();
        assert_eq!(first.title.as_deref(), Some("104 British History"));
        assert_eq!(first.guid.as_deref(), Some("104"));
        assert_eq!(first.duration.as_deref(), Some("1:05"));
        assert_eq!(first.author.as_deref(), Some("Someone"));
        assert_eq!(
            first.enclosure,
            Some(Enclosure {
                url: "https://example.com/pod/104_British_History.mp3".to_string(),
                length: 1000,
                mime_type: "audio/mpeg".to_string(),
            })
        );
        assert_eq!(first.media_filename(), Some("104_British_History.mp3"));

        let second = doc.entries.get(1).unwrap();
        assert_eq!(second.display_title(), "Hand written");
        assert!(second.enclosure.is_none());
        assert!(second.media_filename().is_none());
    }

    #[test]
    fn to_rss_keeps_unmodelled_fields() {
        let doc = parse(SAMPLE_FEED);
        let channel = doc.to_rss();

        assert_eq!(
            channel.image().map(|image| image.url()),
            Some("https://example.com/pod/cover.jpg")
        );
        assert_eq!(channel.items()[1].link(), Some("https://example.com/notes"));
    }

    #[test]
    fn to_rss_writes_single_self_link() {
        let mut doc = parse(SAMPLE_FEED);
        doc.channel.self_link = Some("https://example.com/other/feed.xml".to_string());

        let channel = doc.to_rss();
        let links = channel.atom_ext().unwrap().links();
        let self_links: Vec<_> = links.iter().filter(|link| link.rel() == "self").collect();

        assert_eq!(self_links.len(), 1);
        assert_eq!(self_links[0].href(), "https://example.com/other/feed.xml");
    }

    #[test]
    fn new_entry_guid_is_not_a_permalink() {
        let mut doc = Document::new(Channel::new("T", "https://example.com/", "D"));
        doc.entries.insert_at_head(Entry {
            title: Some("New".to_string()),
            guid: Some("7".to_string()),
            duration: Some("0:30".to_string()),
            ..Default::default()
        });

        let channel = doc.to_rss();
        let item = &channel.items()[0];
        let guid = item.guid().unwrap();

        assert_eq!(guid.value(), "7");
        assert!(!guid.is_permalink());
        assert_eq!(item.itunes_ext().unwrap().duration(), Some("0:30"));
    }

    #[test]
    fn loaded_guid_keeps_permalink_flag() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>T</title>
    <link>https://example.com/</link>
    <description>D</description>
    <item>
      <title>Linked</title>
      <guid isPermaLink="true">https://example.com/linked</guid>
    </item>
  </channel>
</rss>"#;
        let doc = parse(xml);
        let channel = doc.to_rss();

        assert!(channel.items()[0].guid().unwrap().is_permalink());
    }

    #[test]
    fn entry_equality_ignores_raw_source() {
        let doc = parse(SAMPLE_FEED);
        let loaded = doc.entries.get(0).unwrap().clone();
        let mut fresh = loaded.clone();
        fresh.raw = None;

        assert_eq!(loaded, fresh);
    }

    #[test]
    fn entry_list_inserts_at_head() {
        let mut list = EntryList::new();
        list.insert_at_head(Entry {
            guid: Some("old".to_string()),
            ..Default::default()
        });
        list.insert_at_head(Entry {
            guid: Some("new".to_string()),
            ..Default::default()
        });

        let guids: Vec<_> = list.iter().map(|e| e.guid.as_deref().unwrap()).collect();
        assert_eq!(guids, vec!["new", "old"]);
    }

    #[test]
    fn entry_list_remove_head_undoes_insert() {
        let mut list: EntryList = vec![Entry {
            guid: Some("a".to_string()),
            ..Default::default()
        }]
        .into_iter()
        .collect();

        list.insert_at_head(Entry {
            guid: Some("b".to_string()),
            ..Default::default()
        });
        let removed = list.remove_head().unwrap();

        assert_eq!(removed.guid.as_deref(), Some("b"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().guid.as_deref(), Some("a"));
    }

    #[test]
    fn entry_list_remove_head_on_empty_list() {
        assert!(EntryList::new().remove_head().is_none());
    }

    #[test]
    fn entry_list_remove_unless_preserves_order() {
        let mut list: EntryList = ["1", "2", "3", "4"]
            .iter()
            .map(|guid| Entry {
                guid: Some(guid.to_string()),
                ..Default::default()
            })
            .collect();

        let removed = list.remove_unless(|e| !matches!(e.guid.as_deref(), Some("2") | Some("4")));

        let kept: Vec<_> = list.iter().map(|e| e.guid.clone().unwrap()).collect();
        let gone: Vec<_> = removed.iter().map(|e| e.guid.clone().unwrap()).collect();
        assert_eq!(kept, vec!["1", "3"]);
        assert_eq!(gone, vec!["2", "4"]);
    }

    #[test]
    fn entry_list_guids_skips_entries_without_guid() {
        let list: EntryList = vec![
            Entry {
                guid: Some("a".to_string()),
                ..Default::default()
            },
            Entry::default(),
        ]
        .into_iter()
        .collect();

        let guids = list.guids();
        assert_eq!(guids.len(), 1);
        assert!(guids.contains("a"));
    }
}
