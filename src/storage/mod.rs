//! Storage abstractions for digest persistence.
//!
//! A run touches two kinds of files, both relative to one root directory:
//!
//! ```text
//! {root}/
//! ├── digest.toml                 # Configuration
//! ├── README.md                   # Rendered document (rewritten every run)
//! └── docs/
//!     ├── arxiv-daily.json        # Store: topic → key → table row
//!     ├── arxiv-daily-web.json    # Optional store of web-list entries
//!     └── index.md                # Optional web document
//! ```
//!
//! Both are replaced wholesale on write. A run assumes it is the only process
//! touching these files; nothing is locked.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Store;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for digest storage backends.
#[async_trait]
pub trait DigestStorage: Send + Sync {
    /// Load a store. A missing or empty file is an empty store; unparseable
    /// content is `AppError::CorruptStore`.
    async fn load_store(&self, key: &str) -> Result<Store>;

    /// Replace a store's persisted content.
    async fn save_store(&self, key: &str, store: &Store) -> Result<()>;

    /// Replace a rendered document.
    async fn write_document(&self, key: &str, content: &str) -> Result<()>;
}
