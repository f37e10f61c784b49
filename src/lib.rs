pub mod config;
pub mod error;
pub mod feed;
pub mod media;
pub mod progress;
pub mod publish;
pub mod state;
pub mod sync;

// Re-export main types for convenience
pub use config::{CONFIG_FILENAME, Config, default_config_path};
pub use error::{
    ConfigError, FeedError, IngestError, InventoryError, ProbeError, PublishError, RelocateError,
    SyncError,
};
pub use feed::{ChannelDefaults, Document, Enclosure, Entry, EntryList, load_or_init, save};
pub use media::{FsRelocator, MediaInfo, MediaProbe, Mp3Probe, Relocator};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use publish::{GitPublisher, PublishOptions, Publisher, publish_changes};
pub use state::{CandidateFile, MediaInventory};
pub use sync::{
    DocumentState, EntrySettings, IngestOutcome, SyncOptions, SyncResult, ingest, reconcile,
    refresh_build_timestamp, run_sync,
};
