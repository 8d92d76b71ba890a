//! HTTP Range request parsing module
//!
//! Single-range `bytes=` parsing (RFC 9110 section 14.2). Multi-range requests
//! are answered with the full body.

/// Inclusive byte span resolved against the asset length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a 206 response
    pub fn content_range(&self, total: usize) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Serve the given span with 206
    Valid(ByteRange),
    /// Respond 416
    NotSatisfiable,
    /// No header, other unit, or malformed: serve the full body
    None,
}

/// Parse a `Range` header against an asset of `size` bytes
///
/// # Examples
/// ```
/// use viewkit::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// assert_eq!(
///     parse_range_header(Some("bytes=0-99"), 1000),
///     RangeParseResult::Valid(ByteRange { start: 0, end: 99 })
/// );
/// assert_eq!(parse_range_header(None, 1000), RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, size: usize) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };
    if spec.contains(',') {
        return RangeParseResult::None;
    }
    let Some((first, last)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        // "-N": final N bytes
        return match last.parse::<usize>() {
            Ok(0) => RangeParseResult::NotSatisfiable,
            Ok(_) if size == 0 => RangeParseResult::NotSatisfiable,
            Ok(n) => RangeParseResult::Valid(ByteRange {
                start: size.saturating_sub(n),
                end: size - 1,
            }),
            Err(_) => RangeParseResult::None,
        };
    }

    let Ok(start) = first.parse::<usize>() else {
        return RangeParseResult::None;
    };
    if start >= size {
        return RangeParseResult::NotSatisfiable;
    }
    let end = if last.is_empty() {
        size - 1
    } else {
        match last.parse::<usize>() {
            Ok(e) if e < start => return RangeParseResult::None,
            Ok(e) => e.min(size - 1),
            Err(_) => return RangeParseResult::None,
        }
    };

    RangeParseResult::Valid(ByteRange { start, end })
}
