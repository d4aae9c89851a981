pub mod fts;
pub mod memory;
pub mod models;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use models::IndexedMessage;

use crate::search::{SearchError, SearchHit, SearchParams};

/// Trait defining the full-text index a search runs against
/// This allows swapping index implementations (SQLite FTS5, in-memory, etc.)
#[async_trait]
pub trait MessageIndex: Send + Sync {
    /// Run one scoped, ranked, paginated query.
    ///
    /// Rows must be restricted to `params.owner_id` and `params.scope`,
    /// matched against `params.query`, ordered most relevant first, with
    /// `params.offset` rows skipped and at most `params.limit` returned.
    async fn search(&self, params: &SearchParams) -> Result<Vec<SearchHit>, SearchError>;

    /// Release held resources. Searches issued afterwards fail with
    /// `IndexUnavailable`.
    async fn close(&self) {}
}

/// Write side of an index, used to load demo data
#[async_trait]
pub trait IndexWriter: Send + Sync {
    /// Add one message to the index
    async fn index_message(&self, message: IndexedMessage) -> Result<()>;

    /// Number of indexed messages belonging to an owner
    async fn count_for_owner(&self, owner_id: &str) -> Result<i64>;
}
