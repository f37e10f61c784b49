// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Naming conventions shared by the feed and the media directories.
//!
//! Staged files are expected to be named `<id>_<Words_Of_The_Title>.mp3`.
//! The `<id>` prefix becomes the entry GUID, the rest becomes the title.
//! Enclosure URLs are always `base_url + filename`, so the filename can be
//! recovered from the last path segment of the URL.

/// Extension (without dot) of the media files we publish
pub const MEDIA_EXTENSION: &str = "mp3";

/// MIME type written into every enclosure we create
pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";

/// Separates the GUID prefix from the rest of a staged filename
pub const GUID_DELIMITER: char = '_';

/// Check whether a filename carries the supported media extension (case-insensitive)
pub fn is_media_file(filename: &str) -> bool {
    split_extension(filename).1.is_some()
}

/// Derive the entry GUID from a staged filename
///
/// Returns everything before the first [`GUID_DELIMITER`]. A filename without
/// a delimiter is used as-is, extension included.
pub fn derive_guid(filename: &str) -> &str {
    filename
        .split_once(GUID_DELIMITER)
        .map_or(filename, |(prefix, _)| prefix)
}

/// Extract the media filename referenced by an enclosure URL
///
/// Query strings and fragments are ignored; the final path segment is returned.
pub fn extract_filename(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    path.rsplit('/').next().unwrap_or(path)
}

/// Build a display title from a staged filename
///
/// The media extension is dropped, delimiters become spaces and the result is trimmed.
pub fn title_from_filename(filename: &str) -> String {
    let (stem, _) = split_extension(filename);
    stem.replace(GUID_DELIMITER, " ").trim().to_string()
}

/// Build the public enclosure URL for a published file
pub fn enclosure_url(base_url: &str, filename: &str) -> String {
    if base_url.ends_with('/') {
        format!("{}{}", base_url, filename)
    } else {
        format!("{}/{}", base_url, filename)
    }
}

/// Split off the media extension if present, returning (stem, extension)
fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case(MEDIA_EXTENSION) => (stem, Some(ext)),
        _ => (filename, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // is_media_file tests

    #[test]
    fn media_file_matches_lowercase_extension() {
        assert!(is_media_file("104_British_History.mp3"));
    }

    #[test]
    fn media_file_matches_uppercase_extension() {
        assert!(is_media_file("LOUD.MP3"));
        assert!(is_media_file("Mixed.Mp3"));
    }

    #[test]
    fn media_file_rejects_other_extensions() {
        assert!(!is_media_file("feed.xml"));
        assert!(!is_media_file("notes.mp3.txt"));
        assert!(!is_media_file("mp3"));
        assert!(!is_media_file("_new_uploads"));
    }

    // derive_guid tests

    #[test]
    fn guid_is_prefix_before_first_delimiter() {
        assert_eq!(derive_guid("104_British_History.mp3"), "104");
    }

    #[test]
    fn guid_uses_first_delimiter_only() {
        assert_eq!(derive_guid("200_a_b_c.mp3"), "200");
    }

    #[test]
    fn guid_without_delimiter_is_whole_filename() {
        assert_eq!(derive_guid("episode.mp3"), "episode.mp3");
    }

    #[test]
    fn guid_with_leading_delimiter_is_empty() {
        assert_eq!(derive_guid("_hidden.mp3"), "");
    }

    // extract_filename tests

    #[test]
    fn filename_is_last_path_segment() {
        assert_eq!(
            extract_filename("https://example.com/podcasts/old.mp3"),
            "old.mp3"
        );
    }

    #[test]
    fn filename_ignores_query_and_fragment() {
        assert_eq!(
            extract_filename("https://example.com/ep.mp3?dl=1#t=10"),
            "ep.mp3"
        );
    }

    #[test]
    fn filename_of_bare_name_is_itself() {
        assert_eq!(extract_filename("ep.mp3"), "ep.mp3");
    }

    #[test]
    fn filename_of_trailing_slash_is_empty() {
        assert_eq!(extract_filename("https://example.com/dir/"), "");
    }

    #[test]
    fn filename_roundtrips_through_enclosure_url() {
        let url = enclosure_url("https://example.com/pod/", "104_British_History.mp3");
        assert_eq!(extract_filename(&url), "104_British_History.mp3");
    }

    // title_from_filename tests

    #[test]
    fn title_replaces_delimiters_and_drops_extension() {
        assert_eq!(
            title_from_filename("104_British_History.mp3"),
            "104 British History"
        );
    }

    #[test]
    fn title_drops_uppercase_extension() {
        assert_eq!(title_from_filename("7_Loud.MP3"), "7 Loud");
    }

    #[test]
    fn title_trims_surrounding_delimiters() {
        assert_eq!(title_from_filename("_Intro_.mp3"), "Intro");
    }

    #[test]
    fn title_keeps_inner_dots() {
        assert_eq!(title_from_filename("12_Vol.2_Live.mp3"), "12 Vol.2 Live");
    }

    // enclosure_url tests

    #[test]
    fn enclosure_url_appends_filename() {
        assert_eq!(
            enclosure_url("https://example.com/", "a.mp3"),
            "https://example.com/a.mp3"
        );
    }

    #[test]
    fn enclosure_url_inserts_missing_slash() {
        assert_eq!(
            enclosure_url("https://example.com/pod", "a.mp3"),
            "https://example.com/pod/a.mp3"
        );
    }
}
