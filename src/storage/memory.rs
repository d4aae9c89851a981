//! In-memory message index
//!
//! A deterministic stand-in for the FTS5 index: documents are kept in
//! insertion order, every query term must match (implicit AND), and ranking
//! is delegated to a pluggable [`Ranker`]. Ties keep insertion order, the same
//! way FTS5 falls back to rowid.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::{models::IndexedMessage, IndexWriter, MessageIndex};
use crate::search::{SearchError, SearchHit, SearchParams};

/// Lowercase and split on anything that is not alphanumeric
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a query into its required terms.
///
/// Double quotes group a phrase; a phrase contributes its terms. An unclosed
/// quote or a query without any term is rejected.
pub fn parse_query(query: &str) -> Result<Vec<String>, SearchError> {
    if query.chars().filter(|&c| c == '"').count() % 2 != 0 {
        return Err(SearchError::MalformedQuery("unterminated string".to_string()));
    }

    let mut seen = HashSet::new();
    let terms: Vec<String> = tokenize(query)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect();

    if terms.is_empty() {
        return Err(SearchError::MalformedQuery(format!(
            "syntax error near {:?}",
            query
        )));
    }
    Ok(terms)
}

/// Corpus-wide statistics a ranker may use
#[derive(Debug, Clone, Default)]
pub struct CorpusStats {
    /// Number of documents in the whole index
    pub doc_count: usize,
    /// Mean document length in tokens
    pub avg_doc_len: f64,
    /// Documents containing each query term
    pub doc_freqs: HashMap<String, usize>,
}

impl CorpusStats {
    fn collect<'a>(docs: impl Iterator<Item = &'a [String]>, terms: &[String]) -> Self {
        let mut stats = CorpusStats::default();
        let mut total_len = 0usize;

        for doc in docs {
            stats.doc_count += 1;
            total_len += doc.len();
            for term in terms {
                if doc.contains(term) {
                    *stats.doc_freqs.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        if stats.doc_count > 0 {
            stats.avg_doc_len = total_len as f64 / stats.doc_count as f64;
        }
        stats
    }

    pub fn doc_freq(&self, term: &str) -> usize {
        self.doc_freqs.get(term).copied().unwrap_or(0)
    }
}

/// Ranking function: query terms x document x corpus -> score.
/// Lower scores are more relevant.
pub trait Ranker: Send + Sync {
    fn score(&self, terms: &[String], doc: &[String], stats: &CorpusStats) -> f64;
}

/// Okapi BM25, negated to follow the FTS5 `bm25()` convention
#[derive(Debug, Clone)]
pub struct Bm25Ranker {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Ranker {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Ranker {
    /// IDF(t) = ln((N - df + 0.5) / (df + 0.5) + 1)
    fn idf(&self, term: &str, stats: &CorpusStats) -> f64 {
        let n = stats.doc_count as f64;
        let df = stats.doc_freq(term) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }
}

impl Ranker for Bm25Ranker {
    fn score(&self, terms: &[String], doc: &[String], stats: &CorpusStats) -> f64 {
        let doc_len = doc.len() as f64;
        let avg = if stats.avg_doc_len > 0.0 {
            stats.avg_doc_len
        } else {
            1.0
        };

        let relevance: f64 = terms
            .iter()
            .map(|term| {
                let tf = doc.iter().filter(|t| *t == term).count() as f64;
                let norm = tf + self.k1 * (1.0 - self.b + self.b * doc_len / avg);
                self.idf(term, stats) * tf * (self.k1 + 1.0) / norm
            })
            .sum();

        -relevance
    }
}

struct Document {
    message: IndexedMessage,
    tokens: Vec<String>,
}

/// In-memory implementation of MessageIndex
pub struct MemoryIndex {
    documents: RwLock<Vec<Document>>,
    available: AtomicBool,
    ranker: Box<dyn Ranker>,
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIndex {
    /// Create an empty index ranked with BM25
    pub fn new() -> Self {
        Self::with_ranker(Bm25Ranker::default())
    }

    pub fn with_ranker(ranker: impl Ranker + 'static) -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
            ranker: Box::new(ranker),
        }
    }

    /// Mark the index reachable or not. While unavailable every search fails
    /// with `IndexUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }
}

#[async_trait]
impl MessageIndex for MemoryIndex {
    async fn search(&self, params: &SearchParams) -> Result<Vec<SearchHit>, SearchError> {
        if !self.available.load(Ordering::Acquire) {
            return Err(SearchError::IndexUnavailable(
                "memory index is offline".to_string(),
            ));
        }

        let terms = parse_query(&params.query)?;

        let documents = self
            .documents
            .read()
            .map_err(|_| SearchError::IndexUnavailable("memory index lock poisoned".to_string()))?;

        let stats = CorpusStats::collect(documents.iter().map(|d| d.tokens.as_slice()), &terms);

        let mut scored: Vec<(f64, &IndexedMessage)> = documents
            .iter()
            .filter(|d| params.admits(&d.message.owner_id, &d.message.mailbox_id))
            .filter(|d| terms.iter().all(|t| d.tokens.contains(t)))
            .map(|d| (self.ranker.score(&terms, &d.tokens, &stats), &d.message))
            .collect();

        // Stable sort: equal scores keep insertion order
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        let offset = usize::try_from(params.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(params.limit).unwrap_or(usize::MAX);

        Ok(scored
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, message)| SearchHit {
                thread_id: message.thread_id.clone(),
                message_id: message.message_id.clone(),
            })
            .collect())
    }

    async fn close(&self) {
        self.set_available(false);
    }
}

#[async_trait]
impl IndexWriter for MemoryIndex {
    async fn index_message(&self, message: IndexedMessage) -> Result<()> {
        let tokens = message
            .text_fields()
            .iter()
            .flat_map(|field| tokenize(field))
            .collect();

        self.documents
            .write()
            .map_err(|_| anyhow!("memory index lock poisoned"))?
            .push(Document { message, tokens });
        Ok(())
    }

    async fn count_for_owner(&self, owner_id: &str) -> Result<i64> {
        let documents = self
            .documents
            .read()
            .map_err(|_| anyhow!("memory index lock poisoned"))?;
        Ok(documents
            .iter()
            .filter(|d| d.message.owner_id == owner_id)
            .count() as i64)
    }
}
