use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// The textual form bookmarks carry their creation time in, both in the
/// database and on the GitHub star endpoint. Keeping the two identical
/// means an imported star's timestamp round-trips verbatim, and that
/// lexicographic ordering of the stored text is chronological.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Bookmark model - the star of the show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Assigned by the storage engine on creation, never reused.
    pub id: i64,
    pub title: String,
    pub url: String,
    pub notes: Option<String>,
    pub date_added: DateTime<Utc>,
}

/// What the user (or the import pipeline) hands to the Add command.
#[derive(Debug, Clone, Default)]
pub struct BookmarkDraft {
    pub title: String,
    pub url: String,
    pub notes: Option<String>,
    /// When absent, the Add command stamps the record with the current
    /// instant at the moment it executes - not when the draft was built.
    pub date_added: Option<DateTime<Utc>>,
}

impl BookmarkDraft {
    /// Resolves the timestamp fallback, producing a record ready to persist.
    pub fn into_record(self, fallback: DateTime<Utc>) -> NewBookmark {
        NewBookmark {
            title: self.title,
            url: self.url,
            notes: self.notes,
            date_added: self.date_added.unwrap_or(fallback),
        }
    }
}

/// A fully-resolved record on its way into the persistence layer.
/// The id is still the storage engine's to assign.
#[derive(Debug, Clone)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub notes: Option<String>,
    pub date_added: DateTime<Utc>,
}

/// Single-field replacement for the Edit command. One variant per
/// editable column; id and date_added are immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Title(String),
    Url(String),
    Notes(Option<String>),
}

/// How listings are ordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    DateAdded,
    Title,
}

impl SortKey {
    /// Column name for the ORDER BY clause. Trusted identifiers, never
    /// user input.
    pub fn column(self) -> &'static str {
        match self {
            SortKey::DateAdded => "date_added",
            SortKey::Title => "title",
        }
    }
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}
