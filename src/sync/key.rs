//! Cache identity for remote queries.

use crate::api::types::{NoteId, NoteTag};

/// Identity of one remote query. Two keys are equal iff every component is
/// equal; equality is cache identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
  /// One page of the note listing.
  List {
    search: String,
    page: u32,
    tag: Option<NoteTag>,
  },
  /// A single note by id.
  Detail { id: NoteId },
}

impl QueryKey {
  pub fn list(search: impl Into<String>, page: u32, tag: Option<NoteTag>) -> Self {
    QueryKey::List {
      search: search.into(),
      page,
      tag,
    }
  }

  pub fn detail(id: NoteId) -> Self {
    QueryKey::Detail { id }
  }

  pub fn is_list(&self) -> bool {
    matches!(self, QueryKey::List { .. })
  }

  /// Whether this key falls under `prefix`.
  pub fn matches(&self, prefix: &QueryPrefix) -> bool {
    match (self, prefix) {
      (QueryKey::List { .. }, QueryPrefix::Lists) => true,
      (QueryKey::Detail { id }, QueryPrefix::Detail(target)) => id == target,
      _ => false,
    }
  }

  /// Human-readable form for logging.
  pub fn describe(&self) -> String {
    match self {
      QueryKey::List { search, page, tag } => {
        let tag = tag.map(|t| t.as_str()).unwrap_or("all");
        if search.is_empty() {
          format!("notes page {} [{}]", page, tag)
        } else {
          format!("notes '{}' page {} [{}]", search, page, tag)
        }
      }
      QueryKey::Detail { id } => format!("note {}", id),
    }
  }
}

/// Partial key selecting a family of cache entries without enumerating
/// exact keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPrefix {
  /// Every note-listing query, regardless of search, page, or tag.
  Lists,
  /// A single note's detail entry.
  Detail(NoteId),
}
