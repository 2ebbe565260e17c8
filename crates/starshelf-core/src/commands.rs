use chrono::Utc;
use tracing::info;

use crate::import::{self, StarSource};
use crate::models::{Bookmark, BookmarkDraft, FieldUpdate, SortKey};
use crate::persistence::PersistenceLayer;
use crate::{Error, Result};

/// One user-facing action. The menu can only do a fixed set of things,
/// so the commands are a tagged enum rather than one trait object per
/// action - the whole set is known at compile time.
#[derive(Debug, Clone)]
pub enum Command {
    /// Persist a new bookmark; the draft's missing timestamp resolves
    /// to "now" when the command executes.
    Add { draft: BookmarkDraft },
    /// Read every bookmark, ordered by the chosen key.
    List { order_by: SortKey },
    /// Replace one field of one record.
    Edit { id: i64, update: FieldUpdate },
    /// Remove one record. A missing id removes nothing.
    Delete { id: i64 },
    /// Pull every starred repository of a GitHub user into bookmarks.
    Import {
        github_username: String,
        preserve_timestamps: bool,
    },
    /// Exit the process on the spot.
    Quit,
}

/// What a command hands back for the shell to render.
#[derive(Debug)]
pub enum Outcome {
    Done,
    Listing(Vec<Bookmark>),
    Imported(usize),
}

/// Executes commands against an injected persistence layer and,
/// for imports, an injected star source. Commands never reach the
/// storage engine directly.
pub struct CommandRunner {
    persistence: Box<dyn PersistenceLayer>,
    stars: Option<Box<dyn StarSource>>,
}

impl CommandRunner {
    pub fn new(persistence: Box<dyn PersistenceLayer>) -> Self {
        Self {
            persistence,
            stars: None,
        }
    }

    pub fn with_star_source(mut self, source: Box<dyn StarSource>) -> Self {
        self.stars = Some(source);
        self
    }

    pub async fn run(&self, command: Command) -> Result<Outcome> {
        match command {
            Command::Add { draft } => {
                self.add(draft)?;
                Ok(Outcome::Done)
            }
            Command::List { order_by } => {
                let bookmarks = self.persistence.list(Some(order_by))?;
                Ok(Outcome::Listing(bookmarks))
            }
            Command::Edit { id, update } => {
                self.persistence.edit(id, update)?;
                Ok(Outcome::Done)
            }
            Command::Delete { id } => {
                self.persistence.delete(id)?;
                Ok(Outcome::Done)
            }
            Command::Import {
                github_username,
                preserve_timestamps,
            } => {
                let count = import::run(self, &github_username, preserve_timestamps).await?;
                Ok(Outcome::Imported(count))
            }
            Command::Quit => {
                info!("quitting");
                std::process::exit(0)
            }
        }
    }

    /// The Add write path. The import pipeline drives this too, so
    /// imported rows are indistinguishable from manual entry. The
    /// fallback instant is taken here, at execution time, not when the
    /// draft was built.
    pub(crate) fn add(&self, draft: BookmarkDraft) -> Result<()> {
        self.persistence.create(draft.into_record(Utc::now()))
    }

    pub(crate) fn star_source(&self) -> Result<&dyn StarSource> {
        self.stars
            .as_deref()
            .ok_or_else(|| Error::Config("no star source configured".into()))
    }
}
