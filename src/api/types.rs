use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque note identifier.
///
/// The server decides the shape; the client never parses it. Prefetching
/// and detail resolution both key the cache through this one type, so the
/// two sides can never diverge on how an identifier is represented.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawNoteId")]
pub struct NoteId(String);

/// Some deployments serve numeric ids, others strings. Normalize both to
/// text at the deserialization boundary.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNoteId {
  Number(i64),
  Text(String),
}

impl From<RawNoteId> for NoteId {
  fn from(raw: RawNoteId) -> Self {
    match raw {
      RawNoteId::Number(n) => NoteId(n.to_string()),
      RawNoteId::Text(s) => NoteId(s),
    }
  }
}

impl NoteId {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for NoteId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for NoteId {
  fn from(value: &str) -> Self {
    NoteId(value.to_string())
  }
}

impl From<String> for NoteId {
  fn from(value: String) -> Self {
    NoteId(value)
  }
}

/// Category tag attached to every note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteTag {
  Todo,
  Work,
  Personal,
  Meeting,
  Shopping,
}

impl NoteTag {
  pub const ALL: [NoteTag; 5] = [
    NoteTag::Todo,
    NoteTag::Work,
    NoteTag::Personal,
    NoteTag::Meeting,
    NoteTag::Shopping,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      NoteTag::Todo => "Todo",
      NoteTag::Work => "Work",
      NoteTag::Personal => "Personal",
      NoteTag::Meeting => "Meeting",
      NoteTag::Shopping => "Shopping",
    }
  }
}

impl fmt::Display for NoteTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for NoteTag {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    NoteTag::ALL
      .iter()
      .copied()
      .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| format!("unknown tag '{}' (expected one of Todo, Work, Personal, Meeting, Shopping)", s))
  }
}

/// A note as the server returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
  pub id: NoteId,
  pub title: String,
  pub content: String,
  pub tag: NoteTag,
  pub created_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
  pub title: String,
  pub content: String,
  pub tag: NoteTag,
}

/// One page of the note listing. `total_pages` comes from the server; the
/// client never computes it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePage {
  pub notes: Vec<Note>,
  pub total_pages: u32,
}
