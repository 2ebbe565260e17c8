// GitHub API client for the star import pipeline
pub mod github;
pub mod retry;

// Re-export common types
pub use github::{ApiError, StarredEntry, StarredPage, StarredRepo, StarsClient};
pub use retry::RetryConfig;
