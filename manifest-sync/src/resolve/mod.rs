//! Scenario and content pack resolution.
//!
//! Each manifest entry names a remote location. The resolver fetches the
//! descriptor found there, merges its fields into the entry and stamps it
//! with the location and its latest commit date. Entries are independent:
//! one failing fetch marks that entry and the rest carry on.

mod payload;
mod resolver;
mod summary;

pub use payload::{decode_payload, payload_url, PayloadError};
pub use resolver::{
    ManifestResolver, Resolution, ERROR_KEY, LATEST_UPDATE_KEY, SOURCE_KEYS, URL_KEY,
};
pub use summary::{EntryFailure, ResolveSummary};
