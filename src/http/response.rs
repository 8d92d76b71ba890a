//! HTTP response building module
//!
//! Builders for the status codes the adapters produce. Builder failures are
//! logged and replaced by an empty response rather than propagated.

use super::cache::Validators;
use super::date;
use super::range::ByteRange;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use hyper::{Response, StatusCode};
use std::time::SystemTime;

/// Response body type used throughout the crate
pub type Body = Full<Bytes>;

fn finish(status: StatusCode, builder: hyper::http::response::Builder, body: Bytes) -> Response<Body> {
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to build {status} response: {e}"));
        let mut fallback = Response::new(Full::new(Bytes::new()));
        *fallback.status_mut() = status;
        fallback
    })
}

fn with_validators(
    builder: hyper::http::response::Builder,
    validators: &Validators,
) -> hyper::http::response::Builder {
    builder
        .header(ETAG, &validators.etag)
        .header(
            LAST_MODIFIED,
            date::format_http_date(SystemTime::from(validators.last_modified)),
        )
}

/// 200 with the full body (empty body for HEAD)
pub fn build_full_response(
    data: Bytes,
    content_type: &str,
    validators: &Validators,
    is_head: bool,
) -> Response<Body> {
    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, data.len())
        .header(ACCEPT_RANGES, "bytes");
    let body = if is_head { Bytes::new() } else { data };
    finish(StatusCode::OK, with_validators(builder, validators), body)
}

/// 206 carrying `range` of `data`
pub fn build_partial_response(
    data: &Bytes,
    range: ByteRange,
    content_type: &str,
    validators: &Validators,
    is_head: bool,
) -> Response<Body> {
    let builder = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, range.len())
        .header(CONTENT_RANGE, range.content_range(data.len()))
        .header(ACCEPT_RANGES, "bytes");
    let body = if is_head {
        Bytes::new()
    } else {
        data.slice(range.start..=range.end)
    };
    finish(
        StatusCode::PARTIAL_CONTENT,
        with_validators(builder, validators),
        body,
    )
}

/// 304 Not Modified
pub fn build_304_response(validators: &Validators) -> Response<Body> {
    let builder = Response::builder().status(StatusCode::NOT_MODIFIED);
    finish(
        StatusCode::NOT_MODIFIED,
        with_validators(builder, validators),
        Bytes::new(),
    )
}

/// 416 Range Not Satisfiable
pub fn build_416_response(size: usize) -> Response<Body> {
    let builder = Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_RANGE, format!("bytes */{size}"));
    finish(
        StatusCode::RANGE_NOT_SATISFIABLE,
        builder,
        Bytes::from_static(b"416 Range Not Satisfiable"),
    )
}

/// 404 Not Found
pub fn build_404_response() -> Response<Body> {
    let builder = Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8");
    finish(
        StatusCode::NOT_FOUND,
        builder,
        Bytes::from_static(b"404 Not Found"),
    )
}

/// 500 Internal Server Error
pub fn build_500_response() -> Response<Body> {
    let builder = Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CACHE_CONTROL, "no-store");
    finish(
        StatusCode::INTERNAL_SERVER_ERROR,
        builder,
        Bytes::from_static(b"500 Internal Server Error"),
    )
}

/// 200 with a rendered document
pub fn build_rendered_response(body: Vec<u8>, content_type: &str, is_head: bool) -> Response<Body> {
    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, body.len());
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(body)
    };
    finish(StatusCode::OK, builder, body)
}
