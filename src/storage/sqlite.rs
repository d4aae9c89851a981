use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::QueryBuilder;
use std::str::FromStr;
use tracing::info;

use super::{fts, models::IndexedMessage, IndexWriter, MessageIndex};
use crate::search::{MailboxScope, SearchError, SearchHit, SearchParams};

/// SQLite FTS5 implementation of MessageIndex
pub struct SqliteIndex {
    pool: SqlitePool,
}

impl SqliteIndex {
    /// Connect to the given database URL and make sure the index table exists
    pub async fn new(database_url: &str) -> Result<Self> {
        info!("Connecting to SQLite index: {}", database_url);

        // Parse connection options and enable create_if_missing
        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `sqlite::memory:` opens its own empty database,
        // so an in-memory index must live on one connection that never expires.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(connect_options).await?;

        sqlx::query(fts::CREATE_MESSAGE_INDEX)
            .execute(&pool)
            .await?;

        info!("SQLite index initialized successfully");

        Ok(Self { pool })
    }
}

#[async_trait]
impl MessageIndex for SqliteIndex {
    async fn search(&self, params: &SearchParams) -> Result<Vec<SearchHit>, SearchError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT thread_id, message_id FROM message_index WHERE message_index MATCH ",
        );
        query.push_bind(params.query.as_str());
        query.push(" AND owner_id = ");
        query.push_bind(params.owner_id.as_str());
        if let MailboxScope::ScopedTo(mailbox_id) = &params.scope {
            query.push(" AND mailbox_id = ");
            query.push_bind(mailbox_id.as_str());
        }
        // bm25() is negative; ascending puts the best match first
        query.push(" ORDER BY bm25(message_index), rowid LIMIT ");
        query.push_bind(params.limit);
        query.push(" OFFSET ");
        query.push_bind(params.offset);

        let rows = query
            .build_query_as::<(String, String)>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(thread_id, message_id)| SearchHit {
                thread_id,
                message_id,
            })
            .collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl IndexWriter for SqliteIndex {
    async fn index_message(&self, message: IndexedMessage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO message_index (owner_id, mailbox_id, thread_id, message_id, subject, sender, body)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.owner_id)
        .bind(&message.mailbox_id)
        .bind(&message.thread_id)
        .bind(&message.message_id)
        .bind(&message.subject)
        .bind(&message.sender)
        .bind(&message.body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_for_owner(&self, owner_id: &str) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            r#"
            SELECT COUNT(*)
            FROM message_index
            WHERE owner_id = ?
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
