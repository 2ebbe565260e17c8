use std::path::Path;

use starshelf_store::{Database, StoreError, Value};
use tracing::debug;

use crate::models::{format_timestamp, parse_timestamp, Bookmark, FieldUpdate, NewBookmark, SortKey};
use crate::Result;

const TABLE_NAME: &str = "bookmarks";

/// Column order here is the table's column order; `decode_row` relies on it.
const SCHEMA: &[(&str, &str)] = &[
    ("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
    ("title", "TEXT NOT NULL"),
    ("url", "TEXT NOT NULL"),
    ("notes", "TEXT"),
    ("date_added", "TEXT NOT NULL"),
];

/// Trait for bookmark persistence - keeps the command layer independent
/// of where bookmarks actually live.
///
/// This way the SQLite engine could be swapped for a file or a remote
/// store without the commands noticing.
pub trait PersistenceLayer: Send + Sync {
    fn create(&self, bookmark: NewBookmark) -> Result<()>;
    fn list(&self, order_by: Option<SortKey>) -> Result<Vec<Bookmark>>;
    fn edit(&self, id: i64, update: FieldUpdate) -> Result<()>;
    fn delete(&self, id: i64) -> Result<()>;
}

/// The one implementation in the tree: bookmarks in a SQLite table.
/// Construction makes sure the table exists, so every later call can
/// assume it does.
pub struct BookmarkDatabase {
    database: Database,
}

impl BookmarkDatabase {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_database(Database::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_database(Database::open_in_memory()?)
    }

    fn from_database(database: Database) -> Result<Self> {
        database.create_table(TABLE_NAME, SCHEMA)?;
        Ok(Self { database })
    }
}

impl PersistenceLayer for BookmarkDatabase {
    fn create(&self, bookmark: NewBookmark) -> Result<()> {
        let record = [
            ("title", Value::Text(bookmark.title)),
            ("url", Value::Text(bookmark.url)),
            ("notes", optional_text(bookmark.notes)),
            (
                "date_added",
                Value::Text(format_timestamp(bookmark.date_added)),
            ),
        ];
        self.database.insert(TABLE_NAME, &record)?;
        Ok(())
    }

    fn list(&self, order_by: Option<SortKey>) -> Result<Vec<Bookmark>> {
        let rows = self
            .database
            .select(TABLE_NAME, &[], order_by.map(SortKey::column))?;
        rows.into_iter().map(decode_row).collect()
    }

    fn edit(&self, id: i64, update: FieldUpdate) -> Result<()> {
        let affected = self.database.update(
            TABLE_NAME,
            &[("id", Value::Integer(id))],
            &[update_column(update)],
        )?;
        debug!(id, affected, "edited bookmark");
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<()> {
        let affected = self
            .database
            .delete(TABLE_NAME, &[("id", Value::Integer(id))])?;
        debug!(id, affected, "deleted bookmark");
        Ok(())
    }
}

fn optional_text(text: Option<String>) -> Value {
    match text {
        Some(text) => Value::Text(text),
        None => Value::Null,
    }
}

/// Maps a single-field update onto its column. The names come from this
/// module, not from the user.
fn update_column(update: FieldUpdate) -> (&'static str, Value) {
    match update {
        FieldUpdate::Title(title) => ("title", Value::Text(title)),
        FieldUpdate::Url(url) => ("url", Value::Text(url)),
        FieldUpdate::Notes(notes) => ("notes", optional_text(notes)),
    }
}

/// Positional decode in `SCHEMA` order: id, title, url, notes, date_added.
fn decode_row(row: Vec<Value>) -> Result<Bookmark> {
    let mut fields = row.into_iter();

    let id = match fields.next() {
        Some(Value::Integer(id)) => id,
        _ => return Err(StoreError::UnexpectedType("id").into()),
    };
    let title = required_text(fields.next(), "title")?;
    let url = required_text(fields.next(), "url")?;
    let notes = match fields.next() {
        Some(Value::Text(text)) => Some(text),
        Some(Value::Null) => None,
        _ => return Err(StoreError::UnexpectedType("notes").into()),
    };
    let date_added = parse_timestamp(&required_text(fields.next(), "date_added")?)?;

    Ok(Bookmark {
        id,
        title,
        url,
        notes,
        date_added,
    })
}

fn required_text(value: Option<Value>, column: &'static str) -> Result<String> {
    match value {
        Some(Value::Text(text)) => Ok(text),
        _ => Err(StoreError::UnexpectedType(column).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(title: &str, url: &str, year: i32) -> NewBookmark {
        NewBookmark {
            title: title.into(),
            url: url.into(),
            notes: None,
            date_added: Utc.with_ymd_and_hms(year, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_create_then_list_populates_id_and_timestamp() {
        let store = BookmarkDatabase::open_in_memory().unwrap();
        store.create(record("Rust", "https://rust-lang.org", 2023)).unwrap();

        let bookmarks = store.list(None).unwrap();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].id, 1);
        assert_eq!(bookmarks[0].title, "Rust");
        assert_eq!(
            bookmarks[0].date_added,
            Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_edit_changes_only_the_named_field() {
        let store = BookmarkDatabase::open_in_memory().unwrap();
        store.create(record("old title", "http://kept", 2023)).unwrap();

        store.edit(1, FieldUpdate::Title("new title".into())).unwrap();

        let bookmarks = store.list(None).unwrap();
        assert_eq!(bookmarks[0].title, "new title");
        assert_eq!(bookmarks[0].url, "http://kept");
        assert_eq!(bookmarks[0].notes, None);

        // Editing to the same value again changes nothing further
        store.edit(1, FieldUpdate::Title("new title".into())).unwrap();
        assert_eq!(store.list(None).unwrap(), bookmarks);
    }

    #[test]
    fn test_edit_notes_can_clear_them() {
        let store = BookmarkDatabase::open_in_memory().unwrap();
        let mut with_notes = record("noted", "http://n", 2023);
        with_notes.notes = Some("some context".into());
        store.create(with_notes).unwrap();

        store.edit(1, FieldUpdate::Notes(None)).unwrap();
        assert_eq!(store.list(None).unwrap()[0].notes, None);
    }

    #[test]
    fn test_delete_removes_exactly_one_record() {
        let store = BookmarkDatabase::open_in_memory().unwrap();
        store.create(record("one", "http://1", 2023)).unwrap();
        store.create(record("two", "http://2", 2023)).unwrap();

        store.delete(1).unwrap();

        let bookmarks = store.list(None).unwrap();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].id, 2);
    }

    #[test]
    fn test_delete_missing_id_is_a_noop() {
        let store = BookmarkDatabase::open_in_memory().unwrap();
        store.create(record("kept", "http://kept", 2023)).unwrap();

        store.delete(99).unwrap();
        assert_eq!(store.list(None).unwrap().len(), 1);
    }

    #[test]
    fn test_list_orders_by_title_lexicographically() {
        let store = BookmarkDatabase::open_in_memory().unwrap();
        store.create(record("zebra", "http://z", 2020)).unwrap();
        store.create(record("apple", "http://a", 2024)).unwrap();

        let titles: Vec<_> = store
            .list(Some(SortKey::Title))
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["apple", "zebra"]);
    }

    #[test]
    fn test_list_orders_by_date_added_ascending() {
        let store = BookmarkDatabase::open_in_memory().unwrap();
        store.create(record("newer", "http://n", 2024)).unwrap();
        store.create(record("older", "http://o", 2020)).unwrap();

        let titles: Vec<_> = store
            .list(Some(SortKey::DateAdded))
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["older", "newer"]);
    }

    #[test]
    fn test_empty_title_violates_constraint() {
        // NOT NULL is the engine-level guard; empty-string titles are
        // kept out by the shell prompting until it gets a value. A null
        // title must fail loudly here.
        let store = BookmarkDatabase::open_in_memory().unwrap();
        let result = store.database.insert(
            TABLE_NAME,
            &[
                ("url", Value::Text("http://x".into())),
                ("notes", Value::Null),
                ("date_added", Value::Text("2023-06-01T12:00:00Z".into())),
            ],
        );
        assert!(result.is_err());
    }
}
