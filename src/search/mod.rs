//! Message search query engine
//!
//! A search call is two steps: [`normalize`] turns the caller's request into
//! [`SearchParams`], then [`execute`] issues exactly one scoped, ranked,
//! paginated query against a [`MessageIndex`] and maps the rows to
//! [`SearchHit`]s. Neither step keeps state between calls.

pub mod error;
pub mod normalize;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::MessageIndex;
pub use error::SearchError;
pub use normalize::normalize;

/// Caller-supplied search request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Account whose messages may be searched
    pub owner_id: String,
    /// Free-text query in the index's match syntax
    pub query: String,
    /// Restrict the search to one mailbox
    #[serde(default)]
    pub mailbox_id: Option<String>,
    /// Requested page size (default 20, clamped to at least 1)
    #[serde(default)]
    pub limit: Option<f64>,
    /// Requested number of leading matches to skip (clamped to at least 0)
    #[serde(default)]
    pub offset: Option<f64>,
}

impl SearchRequest {
    pub fn new(owner_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            query: query.into(),
            mailbox_id: None,
            limit: None,
            offset: None,
        }
    }

    pub fn with_mailbox(mut self, mailbox_id: impl Into<String>) -> Self {
        self.mailbox_id = Some(mailbox_id.into());
        self
    }

    pub fn with_limit(mut self, limit: f64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Which mailboxes of the owner a search may match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxScope {
    /// Every mailbox owned by the owner
    Unscoped,
    /// Only the given mailbox
    ScopedTo(String),
}

impl MailboxScope {
    /// Whether a message stored in `mailbox_id` falls inside this scope
    pub fn admits(&self, mailbox_id: &str) -> bool {
        match self {
            MailboxScope::Unscoped => true,
            MailboxScope::ScopedTo(scoped) => scoped == mailbox_id,
        }
    }
}

/// Canonical, execution-ready search parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub owner_id: String,
    pub query: String,
    pub scope: MailboxScope,
    /// Always >= 1
    pub limit: i64,
    /// Always >= 0
    pub offset: i64,
}

impl SearchParams {
    /// Whether a message owned by `owner_id` in `mailbox_id` may match
    pub fn admits(&self, owner_id: &str, mailbox_id: &str) -> bool {
        self.owner_id == owner_id && self.scope.admits(mailbox_id)
    }
}

/// One matching message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub thread_id: String,
    pub message_id: String,
}

/// Run normalized parameters against an index.
///
/// Results are in ascending rank order (most relevant first), at most
/// `params.limit` long. Index failures propagate unchanged.
pub async fn execute<I>(index: &I, params: &SearchParams) -> Result<Vec<SearchHit>, SearchError>
where
    I: MessageIndex + ?Sized,
{
    let hits = index.search(params).await?;

    debug!(
        owner = %params.owner_id,
        scope = ?params.scope,
        limit = params.limit,
        offset = params.offset,
        hits = hits.len(),
        "Search executed"
    );

    Ok(hits)
}

/// Normalize a request and execute it
pub async fn search<I>(index: &I, request: SearchRequest) -> Result<Vec<SearchHit>, SearchError>
where
    I: MessageIndex + ?Sized,
{
    let params = normalize(request);
    execute(index, &params).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryIndex;
    use crate::storage::models::IndexedMessage;
    use crate::storage::IndexWriter;

    fn message(owner: &str, mailbox: &str, thread: &str, id: &str, body: &str) -> IndexedMessage {
        IndexedMessage::new(owner, mailbox, thread, id, "", "", body)
    }

    /// Owner u1: m1 (inbox, invoice), m2 (archive, invoice), m3 (inbox, receipt)
    async fn scenario_index() -> MemoryIndex {
        let index = MemoryIndex::new();
        index
            .index_message(message("u1", "inbox", "t1", "m1", "Your invoice for March"))
            .await
            .unwrap();
        index
            .index_message(message(
                "u1",
                "archive",
                "t2",
                "m2",
                "Old invoice attached, see the invoice total",
            ))
            .await
            .unwrap();
        index
            .index_message(message("u1", "inbox", "t3", "m3", "Payment receipt"))
            .await
            .unwrap();
        index
            .index_message(message("u2", "inbox", "t4", "m4", "Someone else's invoice"))
            .await
            .unwrap();
        index
    }

    fn ids(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.message_id.as_str()).collect()
    }

    #[test]
    fn test_scope_admits() {
        assert!(MailboxScope::Unscoped.admits("anything"));
        let scoped = MailboxScope::ScopedTo("inbox".to_string());
        assert!(scoped.admits("inbox"));
        assert!(!scoped.admits("archive"));
    }

    #[test]
    fn test_request_deserializes_from_camel_case() {
        let req: SearchRequest = serde_json::from_str(
            r#"{"ownerId":"u1","query":"invoice","mailboxId":"inbox","limit":2.7}"#,
        )
        .unwrap();
        assert_eq!(req.owner_id, "u1");
        assert_eq!(req.mailbox_id.as_deref(), Some("inbox"));
        assert_eq!(req.limit, Some(2.7));
        assert_eq!(req.offset, None);
    }

    #[test]
    fn test_hit_serializes_to_camel_case() {
        let hit = SearchHit {
            thread_id: "t1".to_string(),
            message_id: "m1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&hit).unwrap(),
            serde_json::json!({ "threadId": "t1", "messageId": "m1" })
        );
    }

    #[tokio::test]
    async fn test_unscoped_search_spans_mailboxes() {
        let index = scenario_index().await;
        let hits = search(&index, SearchRequest::new("u1", "invoice")).await.unwrap();

        let mut found = ids(&hits);
        found.sort();
        assert_eq!(found, vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn test_scoped_search_stays_in_mailbox() {
        let index = scenario_index().await;
        let hits = search(&index, SearchRequest::new("u1", "invoice").with_mailbox("inbox"))
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].message_id, "m1");
        assert_eq!(hits[0].thread_id, "t1");
    }

    #[tokio::test]
    async fn test_negative_pagination_returns_top_match() {
        let index = scenario_index().await;
        let all = search(&index, SearchRequest::new("u1", "invoice")).await.unwrap();
        let clamped = search(
            &index,
            SearchRequest::new("u1", "invoice").with_limit(-5.0).with_offset(-3.0),
        )
        .await
        .unwrap();

        assert_eq!(clamped.len(), 1);
        assert_eq!(clamped[0], all[0]);
    }

    #[tokio::test]
    async fn test_unknown_owner_gets_empty_result() {
        let index = scenario_index().await;
        let hits = search(&index, SearchRequest::new("ghost", "invoice")).await.unwrap();
        assert!(hits.is_empty());

        let hits = search(
            &index,
            SearchRequest::new("ghost", "invoice").with_limit(0.0).with_offset(10.0),
        )
        .await
        .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_offset_past_end_is_empty() {
        let index = scenario_index().await;
        let hits = search(&index, SearchRequest::new("u1", "invoice").with_offset(2.0))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_query_propagates() {
        let index = scenario_index().await;
        let err = search(&index, SearchRequest::new("u1", "\"invoice"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::MalformedQuery(_)));
    }

    #[tokio::test]
    async fn test_unavailable_index_is_not_an_empty_result() {
        let index = scenario_index().await;
        index.set_available(false);

        let err = search(&index, SearchRequest::new("u1", "invoice"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::IndexUnavailable(_)));
    }

    #[tokio::test]
    async fn test_execute_works_through_trait_object() {
        let index = scenario_index().await;
        let dyn_index: &dyn MessageIndex = &index;
        let params = normalize(SearchRequest::new("u1", "receipt"));

        let hits = execute(dyn_index, &params).await.unwrap();
        assert_eq!(ids(&hits), vec!["m3"]);
    }
}
