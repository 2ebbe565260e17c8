use async_trait::async_trait;
use tracing::{debug, info};

use starshelf_api::StarsClient;
pub use starshelf_api::{StarredEntry, StarredPage, StarredRepo};

use crate::commands::CommandRunner;
use crate::models::{parse_timestamp, BookmarkDraft};
use crate::Result;

/// Where starred repositories come from - makes testing easier and
/// keeps the pipeline off the network in unit tests. `StarsClient` is
/// the real implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StarSource: Send + Sync {
    /// URL of the first page for a user; later pages come from
    /// `StarredPage::next_page`.
    fn first_page_url(&self, username: &str) -> String;

    async fn starred_page(&self, url: &str) -> Result<StarredPage>;
}

#[async_trait]
impl StarSource for StarsClient {
    fn first_page_url(&self, username: &str) -> String {
        StarsClient::first_page_url(self, username)
    }

    async fn starred_page(&self, url: &str) -> Result<StarredPage> {
        Ok(StarsClient::starred_page(self, url).await?)
    }
}

/// Pages through a user's starred repositories and drives one Add
/// command per star, so imported rows take exactly the same write path
/// as manual entry (timestamp fallback included). Returns how many
/// bookmarks were added.
///
/// No deduplication: importing twice creates duplicate rows. An error
/// on any page aborts the rest of the import; rows already added stay,
/// since every Add commits on its own.
pub(crate) async fn run(
    runner: &CommandRunner,
    username: &str,
    preserve_timestamps: bool,
) -> Result<usize> {
    let source = runner.star_source()?;
    let mut imported = 0;
    let mut next_page = Some(source.first_page_url(username));

    while let Some(url) = next_page {
        debug!(%url, "fetching starred page");
        let page = source.starred_page(&url).await?;
        next_page = page.next_page;

        for entry in page.entries {
            let draft = draft_from_star(entry, preserve_timestamps)?;
            runner.add(draft)?;
            imported += 1;
        }
    }

    info!(imported, username, "import finished");
    Ok(imported)
}

/// A star becomes a draft: repo name as title, HTML URL as url,
/// description as notes. The star's own timestamp is only parsed when
/// the user asked to keep it; otherwise the Add command stamps "now".
fn draft_from_star(entry: StarredEntry, preserve_timestamps: bool) -> Result<BookmarkDraft> {
    let date_added = if preserve_timestamps {
        Some(parse_timestamp(&entry.starred_at)?)
    } else {
        None
    };

    Ok(BookmarkDraft {
        title: entry.repo.name,
        url: entry.repo.html_url,
        notes: entry.repo.description,
        date_added,
    })
}
