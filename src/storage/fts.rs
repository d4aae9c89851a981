//! SQLite FTS5 schema and error classification

use crate::search::SearchError;

/// FTS5 virtual table holding every searchable message.
/// Scope columns are UNINDEXED so they never take part in text matching.
pub const CREATE_MESSAGE_INDEX: &str = r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS message_index USING fts5(
        owner_id UNINDEXED,
        mailbox_id UNINDEXED,
        thread_id UNINDEXED,
        message_id UNINDEXED,
        subject,
        sender,
        body,
        tokenize = 'porter unicode61'
    )
"#;

/// Columns of `message_index`, in declaration order
pub const INDEX_COLUMNS: &[&str] = &[
    "owner_id",
    "mailbox_id",
    "thread_id",
    "message_id",
    "subject",
    "sender",
    "body",
];

/// Messages FTS5 reports when it cannot parse a MATCH expression
const QUERY_SYNTAX_ERRORS: &[&str] = &[
    "fts5: syntax error",
    "fts5: parser stack overflow",
    "unterminated string",
    "unknown special query",
];

const NO_SUCH_COLUMN: &str = "no such column:";

/// Whether a database error message comes from the FTS5 query parser.
///
/// `no such column` is shared with the SQL compiler: it only blames the
/// query when the column is not one of ours (a `recipient:` filter). A
/// missing index column means the table itself is wrong.
pub fn is_query_syntax_error(message: &str) -> bool {
    if let Some(rest) = message.strip_prefix(NO_SUCH_COLUMN) {
        let column = rest.trim();
        let column = column.rsplit('.').next().unwrap_or(column);
        return !INDEX_COLUMNS.contains(&column);
    }

    QUERY_SYNTAX_ERRORS
        .iter()
        .any(|pattern| message.starts_with(pattern))
}

impl From<sqlx::Error> for SearchError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if is_query_syntax_error(db.message()) => {
                SearchError::MalformedQuery(db.message().to_string())
            }
            _ => SearchError::IndexUnavailable(err.to_string()),
        }
    }
}
