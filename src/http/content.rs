//! Content serving
//!
//! Serves an in-memory body with conditional-GET and single-range semantics.
//! This is the primitive the static middleware hands resolved assets to.

use super::cache::{generate_etag, Conditionals, Validators};
use super::range::{parse_range_header, RangeParseResult};
use super::{date, mime, response};
use hyper::body::Bytes;
use hyper::header::{HeaderMap, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_RANGE, RANGE};
use hyper::{Method, Response};
use std::time::SystemTime;

fn header_str<'a>(headers: &'a HeaderMap, name: &hyper::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Build the response for `data` published under `name`
///
/// `name` only drives content-type detection. `modified` becomes
/// `Last-Modified` at second precision.
pub fn serve_content(
    method: &Method,
    headers: &HeaderMap,
    name: &str,
    modified: SystemTime,
    data: Bytes,
) -> Response<response::Body> {
    let is_head = *method == Method::HEAD;
    let validators = Validators {
        etag: generate_etag(&data),
        last_modified: date::truncate_to_seconds(modified),
    };
    let cond = Conditionals {
        if_none_match: header_str(headers, &IF_NONE_MATCH),
        if_modified_since: header_str(headers, &IF_MODIFIED_SINCE),
        if_range: header_str(headers, &IF_RANGE),
    };

    if validators.not_modified(&cond) {
        return response::build_304_response(&validators);
    }

    let content_type = mime::content_type_for(name);
    let range_header = if validators.range_allowed(&cond) {
        header_str(headers, &RANGE)
    } else {
        None
    };

    match parse_range_header(range_header, data.len()) {
        RangeParseResult::Valid(range) => {
            response::build_partial_response(&data, range, content_type, &validators, is_head)
        }
        RangeParseResult::NotSatisfiable => response::build_416_response(data.len()),
        RangeParseResult::None => {
            response::build_full_response(data, content_type, &validators, is_head)
        }
    }
}
