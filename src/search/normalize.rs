//! Query normalization
//!
//! Turns a loosely-typed [`SearchRequest`] into [`SearchParams`] that the
//! executor can hand to an index without further checks. This step is total:
//! out-of-range pagination is clamped, never rejected.

use super::{MailboxScope, SearchParams, SearchRequest};

/// Page size used when the caller does not ask for one
pub const DEFAULT_LIMIT: i64 = 20;

/// Offset used when the caller does not ask for one
pub const DEFAULT_OFFSET: i64 = 0;

/// Normalize a caller request into execution-ready parameters
pub fn normalize(request: SearchRequest) -> SearchParams {
    // An empty mailbox id scopes nothing
    let scope = match request.mailbox_id.filter(|m| !m.is_empty()) {
        Some(mailbox_id) => MailboxScope::ScopedTo(mailbox_id),
        None => MailboxScope::Unscoped,
    };

    SearchParams {
        owner_id: request.owner_id,
        query: request.query,
        scope,
        limit: effective_limit(request.limit),
        offset: effective_offset(request.offset),
    }
}

/// `max(1, floor(limit ?? 20))`
pub fn effective_limit(limit: Option<f64>) -> i64 {
    to_integer(limit).unwrap_or(DEFAULT_LIMIT).max(1)
}

/// `max(0, floor(offset ?? 0))`
pub fn effective_offset(offset: Option<f64>) -> i64 {
    to_integer(offset).unwrap_or(DEFAULT_OFFSET).max(0)
}

/// Floor a caller-supplied number. NaN counts as absent; infinities and
/// out-of-range values saturate at the `i64` bounds.
fn to_integer(value: Option<f64>) -> Option<i64> {
    value
        .filter(|v| !v.is_nan())
        .map(|v| v.floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(limit: Option<f64>, offset: Option<f64>) -> SearchRequest {
        SearchRequest {
            owner_id: "u1".to_string(),
            query: "invoice".to_string(),
            mailbox_id: None,
            limit,
            offset,
        }
    }

    #[test]
    fn test_defaults_when_absent() {
        let params = normalize(request(None, None));
        assert_eq!(params.limit, 20);
        assert_eq!(params.offset, 0);
        assert_eq!(params.scope, MailboxScope::Unscoped);
    }

    #[test]
    fn test_negative_pagination_is_clamped() {
        let params = normalize(request(Some(-5.0), Some(-3.0)));
        assert_eq!(params.limit, 1);
        assert_eq!(params.offset, 0);
    }

    #[test]
    fn test_zero_limit_becomes_one() {
        assert_eq!(effective_limit(Some(0.0)), 1);
    }

    #[test]
    fn test_fractional_values_are_floored() {
        assert_eq!(effective_limit(Some(7.9)), 7);
        assert_eq!(effective_offset(Some(2.5)), 2);
        // Floors to 0, then clamps to 1
        assert_eq!(effective_limit(Some(0.5)), 1);
        assert_eq!(effective_offset(Some(-0.5)), 0);
    }

    #[test]
    fn test_nan_is_treated_as_absent() {
        assert_eq!(effective_limit(Some(f64::NAN)), DEFAULT_LIMIT);
        assert_eq!(effective_offset(Some(f64::NAN)), DEFAULT_OFFSET);
    }

    #[test]
    fn test_infinities_saturate() {
        assert_eq!(effective_limit(Some(f64::INFINITY)), i64::MAX);
        assert_eq!(effective_limit(Some(f64::NEG_INFINITY)), 1);
        assert_eq!(effective_offset(Some(f64::NEG_INFINITY)), 0);
    }

    #[test]
    fn test_mailbox_becomes_scope() {
        let mut req = request(None, None);
        req.mailbox_id = Some("inbox".to_string());
        let params = normalize(req);
        assert_eq!(params.scope, MailboxScope::ScopedTo("inbox".to_string()));
        assert_eq!(params.owner_id, "u1");
        assert_eq!(params.query, "invoice");
    }

    #[test]
    fn test_empty_mailbox_is_unscoped() {
        let mut req = request(None, None);
        req.mailbox_id = Some(String::new());
        assert_eq!(normalize(req).scope, MailboxScope::Unscoped);
    }

    proptest! {
        #[test]
        fn prop_non_positive_limit_is_exactly_one(limit in -1_000_000i64..=0) {
            prop_assert_eq!(effective_limit(Some(limit as f64)), 1);
        }

        #[test]
        fn prop_negative_offset_is_exactly_zero(offset in -1_000_000i64..0) {
            prop_assert_eq!(effective_offset(Some(offset as f64)), 0);
        }

        #[test]
        fn prop_effective_values_stay_in_range(limit in any::<f64>(), offset in any::<f64>()) {
            let params = normalize(request(Some(limit), Some(offset)));
            prop_assert!(params.limit >= 1);
            prop_assert!(params.offset >= 0);
        }

        #[test]
        fn prop_positive_integers_pass_through(limit in 1i64..10_000, offset in 0i64..10_000) {
            let params = normalize(request(Some(limit as f64), Some(offset as f64)));
            prop_assert_eq!(params.limit, limit);
            prop_assert_eq!(params.offset, offset);
        }
    }
}
