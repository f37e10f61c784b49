mod document;
mod store;

pub use document::{Channel, Document, Enclosure, Entry, EntryList};
pub use store::{ChannelDefaults, DEFAULT_LANGUAGE, load_or_init, render, save};
