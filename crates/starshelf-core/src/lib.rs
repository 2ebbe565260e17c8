// Core business logic lives here - the brain of the operation
pub mod commands;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod persistence;

pub use commands::{Command, CommandRunner, Outcome};
pub use config::Config;
pub use error::Error;
pub use import::StarSource;
pub use models::{Bookmark, BookmarkDraft, FieldUpdate, NewBookmark, SortKey};
pub use persistence::{BookmarkDatabase, PersistenceLayer};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
