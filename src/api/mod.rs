//! The remote NoteHub collection: wire model and HTTP client.

pub mod client;
pub mod types;

use std::future::Future;

pub use client::ApiClient;

use crate::error::FetchError;
use types::{NewNote, Note, NoteId, NotePage, NoteTag};

/// The remote operations the synchronization layer consumes.
///
/// `ApiClient` is the production implementation; store tests substitute
/// counting stubs.
pub trait NotesApi: Clone + Send + Sync + 'static {
  fn list_notes(
    &self,
    search: &str,
    page: u32,
    tag: Option<NoteTag>,
  ) -> impl Future<Output = Result<NotePage, FetchError>> + Send;

  fn get_note(&self, id: &NoteId) -> impl Future<Output = Result<Note, FetchError>> + Send;

  fn create_note(&self, note: &NewNote) -> impl Future<Output = Result<Note, FetchError>> + Send;
}

impl NotesApi for ApiClient {
  async fn list_notes(
    &self,
    search: &str,
    page: u32,
    tag: Option<NoteTag>,
  ) -> Result<NotePage, FetchError> {
    ApiClient::list_notes(self, search, page, tag).await
  }

  async fn get_note(&self, id: &NoteId) -> Result<Note, FetchError> {
    ApiClient::get_note(self, id).await
  }

  async fn create_note(&self, note: &NewNote) -> Result<Note, FetchError> {
    ApiClient::create_note(self, note).await
  }
}
