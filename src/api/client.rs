use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::FetchError;

use super::types::{NewNote, Note, NoteId, NotePage, NoteTag};

/// NoteHub API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base: String,
  token: String,
  page_size: u16,
}

impl ApiClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::api_token()?;

    // Validate the base URL up front so a bad config fails at startup, not
    // on the first fetch.
    Url::parse(&config.api.url)
      .map_err(|e| eyre!("Invalid API url '{}': {}", config.api.url, e))?;

    let http = reqwest::Client::builder()
      .user_agent(concat!("notehub/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base: config.api.url.trim_end_matches('/').to_string(),
      token,
      page_size: config.api.page_size,
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
    Url::parse(&format!("{}{}", self.base, path))
      .map_err(|e| FetchError::Network(format!("invalid request url: {}", e)))
  }

  /// Fetch one page of the note listing.
  pub async fn list_notes(
    &self,
    search: &str,
    page: u32,
    tag: Option<NoteTag>,
  ) -> Result<NotePage, FetchError> {
    let mut url = self.endpoint("/notes")?;
    {
      let mut query = url.query_pairs_mut();
      query.append_pair("page", &page.to_string());
      query.append_pair("perPage", &self.page_size.to_string());
      if !search.is_empty() {
        query.append_pair("search", search);
      }
      if let Some(tag) = tag {
        query.append_pair("tag", tag.as_str());
      }
    }

    debug!(%url, "listing notes");
    let response = self.send(self.http.get(url)).await?;
    Self::decode(response).await
  }

  /// Fetch a single note by id. A 404 becomes `FetchError::NotFound` so the
  /// caller can render a dedicated not-found state.
  pub async fn get_note(&self, id: &NoteId) -> Result<Note, FetchError> {
    let url = self.endpoint(&format!("/notes/{}", id))?;

    debug!(%url, "fetching note");
    let response = self.send(self.http.get(url)).await?;
    if response.status() == StatusCode::NOT_FOUND {
      return Err(FetchError::NotFound(id.clone()));
    }
    Self::decode(response).await
  }

  /// Create a note, returning it as the server stored it.
  pub async fn create_note(&self, note: &NewNote) -> Result<Note, FetchError> {
    let url = self.endpoint("/notes")?;

    debug!(title = %note.title, "creating note");
    let response = self.send(self.http.post(url).json(note)).await?;
    Self::decode(response).await
  }

  async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, FetchError> {
    request
      .bearer_auth(&self.token)
      .send()
      .await
      .map_err(|e| FetchError::Network(e.to_string()))
  }

  async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(FetchError::Status {
        status: status.as_u16(),
        message: error_message(&body),
      });
    }

    response
      .json::<T>()
      .await
      .map_err(|e| FetchError::Decode(e.to_string()))
  }
}

/// Pull the server's `message` field out of an error body, falling back to
/// the raw text.
fn error_message(body: &str) -> String {
  serde_json::from_str::<serde_json::Value>(body)
    .ok()
    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
    .unwrap_or_else(|| body.trim().to_string())
}
