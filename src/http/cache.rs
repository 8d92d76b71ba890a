//! HTTP cache validation module
//!
//! `ETag` generation and the conditional-request checks (`If-None-Match`,
//! `If-Modified-Since`, `If-Range`) used when serving assets.

use super::date;
use chrono::{DateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Strong `ETag` for a body, e.g. `"3f2a9c01d4e5b677"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Whether an `If-None-Match` list contains `etag` or `*`
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|value| {
        value.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.trim_start_matches("W/") == etag
        })
    })
}

/// Validators of the representation being served
#[derive(Debug, Clone)]
pub struct Validators {
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

/// Request headers relevant to conditional serving
#[derive(Debug, Default, Clone, Copy)]
pub struct Conditionals<'a> {
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub if_range: Option<&'a str>,
}

impl Validators {
    /// True when the client copy is current and a 304 should be sent
    ///
    /// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
    /// when it is absent.
    pub fn not_modified(&self, cond: &Conditionals<'_>) -> bool {
        if cond.if_none_match.is_some() {
            return check_etag_match(cond.if_none_match, &self.etag);
        }
        cond.if_modified_since
            .and_then(date::parse_http_date)
            .is_some_and(|since| self.last_modified <= since)
    }

    /// True when a `Range` header may be honoured
    pub fn range_allowed(&self, cond: &Conditionals<'_>) -> bool {
        let Some(if_range) = cond.if_range.map(str::trim) else {
            return true;
        };
        if if_range.starts_with('"') {
            return if_range == self.etag;
        }
        date::parse_http_date(if_range).is_some_and(|at| at == self.last_modified)
    }
}
