mod filename;
mod probe;
mod relocate;

pub use filename::{
    AUDIO_MIME_TYPE, GUID_DELIMITER, MEDIA_EXTENSION, derive_guid, enclosure_url,
    extract_filename, is_media_file, title_from_filename,
};
pub use probe::{MediaInfo, MediaProbe, Mp3Probe, format_duration};
pub use relocate::{FsRelocator, Relocator};
