//! Byte ranges and the range-spec grammar.
//!
//! A range spec has the form `bytes=N?-N?(,N?-N?)*`. Each segment is
//! parsed into a [`ByteRange`] with optional bounds and later resolved
//! against a concrete resource length into a [`ResolvedRange`]
//! (`offset`, `count`) with `offset + count <= length`.

use std::fmt;

use crate::error::AppError;
use crate::result::AppResult;

/// Literal unit prefix of a range spec.
pub const RANGE_UNIT_PREFIX: &str = "bytes=";

/// A requested byte interval with optional bounds.
///
/// - both bounds: inclusive `[start, end]`
/// - only `start`: from `start` to the last byte
/// - only `end`: the last `end` bytes (suffix range)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    /// First byte position.
    pub start: Option<u64>,
    /// Last byte position, or the suffix length when `start` is absent.
    pub end: Option<u64>,
}

/// A concrete byte window inside a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ResolvedRange {
    /// Position of the first byte.
    pub offset: u64,
    /// Number of bytes in the window.
    pub count: u64,
}

/// What a download asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeRequest {
    /// No range spec; the whole content.
    Full,
    /// One or more explicit ranges, in request order.
    Ranges(Vec<ByteRange>),
}

impl ByteRange {
    /// Create a range from optional bounds.
    pub fn new(start: Option<u64>, end: Option<u64>) -> Self {
        Self { start, end }
    }

    /// Inclusive range `[start, end]`.
    pub fn bounded(start: u64, end: u64) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// Range from `start` to the end of the resource.
    pub fn starting_at(start: u64) -> Self {
        Self::new(Some(start), None)
    }

    /// The last `length` bytes of the resource.
    pub fn suffix(length: u64) -> Self {
        Self::new(None, Some(length))
    }

    /// Resolve against a resource length.
    ///
    /// Returns `None` when the range selects no byte of the resource. An end
    /// past the last byte is limited to the last byte, and a suffix longer
    /// than the resource selects all of it. Clamping follows HTTP byte-range
    /// semantics (RFC 7233): only a first byte outside the resource makes a
    /// range unsatisfiable, while an inverted range fails at parse time.
    pub fn resolve(&self, total_length: u64) -> Option<ResolvedRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                if start >= total_length || end < start {
                    return None;
                }
                let last = end.min(total_length - 1);
                Some(ResolvedRange::new(start, last - start + 1))
            }
            (Some(start), None) => {
                if start >= total_length {
                    return None;
                }
                Some(ResolvedRange::new(start, total_length - start))
            }
            (None, Some(suffix)) => {
                if suffix == 0 || total_length == 0 {
                    return None;
                }
                let count = suffix.min(total_length);
                Some(ResolvedRange::new(total_length - count, count))
            }
            (None, None) => None,
        }
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        f.write_str("-")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

impl ResolvedRange {
    /// Create a window of `count` bytes starting at `offset`.
    pub fn new(offset: u64, count: u64) -> Self {
        Self { offset, count }
    }

    /// Position one past the last byte.
    pub fn end_exclusive(&self) -> u64 {
        self.offset + self.count
    }

    /// `Content-Range` value for this window, e.g. `bytes 0-4/20`.
    pub fn content_range(&self, total_length: u64) -> String {
        if self.count == 0 {
            return format!("bytes */{total_length}");
        }
        format!(
            "bytes {}-{}/{}",
            self.offset,
            self.end_exclusive() - 1,
            total_length
        )
    }
}

impl RangeRequest {
    /// Parse an optional range spec. An absent spec requests full content.
    pub fn parse(spec: Option<&str>) -> AppResult<Self> {
        match spec {
            None => Ok(Self::Full),
            Some(spec) => parse_range_spec(spec).map(Self::Ranges),
        }
    }

    /// Whether this is a request for the whole content.
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }

    /// Resolve every range against `total_length`, keeping request order.
    ///
    /// Unsatisfiable ranges are dropped; if none remain the request fails.
    /// A full request always yields one window, even for empty content.
    pub fn resolve(&self, total_length: u64) -> AppResult<Vec<ResolvedRange>> {
        let ranges = match self {
            Self::Full => return Ok(vec![ResolvedRange::new(0, total_length)]),
            Self::Ranges(ranges) => ranges,
        };

        let resolved: Vec<ResolvedRange> = ranges
            .iter()
            .filter_map(|range| range.resolve(total_length))
            .collect();

        if resolved.is_empty() {
            return Err(AppError::unsatisfiable_range(format!(
                "No requested range is satisfiable for length {total_length}"
            )));
        }
        Ok(resolved)
    }
}

/// Parse a `bytes=N?-N?(,N?-N?)*` spec into its ranges.
pub fn parse_range_spec(spec: &str) -> AppResult<Vec<ByteRange>> {
    let body = spec.strip_prefix(RANGE_UNIT_PREFIX).ok_or_else(|| {
        AppError::unsatisfiable_range(format!("Range spec must start with '{RANGE_UNIT_PREFIX}'"))
    })?;

    if body.is_empty() {
        return Err(AppError::unsatisfiable_range("Range spec has no ranges"));
    }

    body.split(',').map(parse_segment).collect()
}

fn parse_segment(segment: &str) -> AppResult<ByteRange> {
    let (start, end) = segment.split_once('-').ok_or_else(|| {
        AppError::unsatisfiable_range(format!("Range segment '{segment}' has no '-'"))
    })?;

    let start = parse_position(segment, start)?;
    let end = parse_position(segment, end)?;

    match (start, end) {
        (None, None) => Err(AppError::unsatisfiable_range(format!(
            "Range segment '{segment}' has neither start nor end"
        ))),
        (Some(s), Some(e)) if e < s => Err(AppError::unsatisfiable_range(format!(
            "Range segment '{segment}' ends before it starts"
        ))),
        _ => Ok(ByteRange::new(start, end)),
    }
}

fn parse_position(segment: &str, digits: &str) -> AppResult<Option<u64>> {
    if digits.is_empty() {
        return Ok(None);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::unsatisfiable_range(format!(
            "Range segment '{segment}' is not numeric"
        )));
    }
    digits.parse::<u64>().map(Some).map_err(|e| {
        AppError::with_source(
            crate::error::ErrorKind::UnsatisfiableRange,
            format!("Range segment '{segment}' is out of bounds"),
            e,
        )
    })
}
