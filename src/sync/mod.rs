//! Client-side synchronization layer.
//!
//! Keeps the paginated, filtered note listing consistent with the remote
//! collection while a single in-progress draft is composed and submitted:
//! debounced search, keyed caching with stale-while-revalidate, in-flight
//! dedupe, prefix invalidation on mutation, and draft persistence across
//! form open/close cycles.

pub mod cache;
pub mod debounce;
pub mod draft;
pub mod key;
pub mod store;
pub mod submit;

pub use cache::DataOrigin;
pub use draft::{DraftPatch, NoteDraft};
pub use store::{DetailSnapshot, ListSnapshot, NotesStore, SyncOptions};
pub use submit::SubmitState;

use crate::api::ApiClient;

/// Store specialization the application runs with.
pub type AppStore = NotesStore<ApiClient>;
