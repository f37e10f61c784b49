use std::path::PathBuf;
use std::sync::Arc;

/// Events emitted during a publish run for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The staging directory did not exist and was created
    StagingCreated { path: PathBuf },

    /// The feed document is ready for reconciliation
    FeedLoaded {
        title: String,
        entries: usize,
        /// True if no feed file existed and a new document was created
        initialized: bool,
    },

    /// An entry was dropped because its media file is gone
    EntryRemoved { title: String, filename: String },

    /// A staged file became a new entry
    EntryAdded {
        title: String,
        guid: String,
        filename: String,
    },

    /// A staged file was left in staging
    CandidateSkipped { filename: String, reason: String },

    /// The feed file was written
    FeedSaved {
        path: PathBuf,
        added_count: usize,
        removed_count: usize,
    },

    /// Nothing changed, the feed was not written
    FeedUnchanged,

    /// A publish step is starting
    PublishStep { description: String },

    /// All publish steps finished
    PublishCompleted,

    /// A publish step failed; local changes are kept
    PublishFailed { error: String },
}

/// Trait for reporting progress events during a run.
///
/// Implementations can use this to display progress, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
