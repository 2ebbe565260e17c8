use thiserror::Error;

/// All the ways things can go wrong in starshelf
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum Error {
    #[error("storage operation failed: {0}")]
    Storage(#[from] starshelf_store::StoreError),

    #[error("GitHub request failed: {0}")]
    Network(#[from] starshelf_api::ApiError),

    #[error("malformed timestamp: {0}")]
    Parse(#[from] chrono::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
