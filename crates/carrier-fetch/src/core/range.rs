/// Read buffer size used when streaming a response body to disk.
pub const CHUNK_SIZE: usize = 4096;

pub const PARTIAL_CONTENT: u16 = 206;

pub const RANGE_NOT_SATISFIABLE: u16 = 416;

/// Value of the `Range` header asking for everything from `offset` on.
///
/// # Examples
///
/// ```
/// use carrier_fetch::core::range_header;
///
/// assert_eq!(range_header(4096), "bytes=4096-");
/// ```
pub fn range_header(offset: u64) -> String { format!("bytes={offset}-") }

/// Returns `true` for any 2xx status.
pub fn is_success(status: u16) -> bool { (200..300).contains(&status) }

/// Returns `true` if an `Accept-Ranges` value advertises byte ranges.
///
/// The header is a comma separated list of range units; `none` (or a missing
/// header) means no range support.
pub fn accepts_byte_ranges(accept_ranges: Option<&str>) -> bool {
    accept_ranges
        .map(|value| value.split(',').any(|unit| unit.trim().eq_ignore_ascii_case("bytes")))
        .unwrap_or(false)
}

/// First byte position of a `Content-Range` value such as
/// `bytes 4096-9999/10000`.
///
/// Unsatisfied ranges (`bytes */10000`) and other units yield `None`.
///
/// # Examples
///
/// ```
/// use carrier_fetch::core::content_range_start;
///
/// assert_eq!(content_range_start(Some("bytes 4096-9999/10000")), Some(4096));
/// assert_eq!(content_range_start(Some("bytes */10000")), None);
/// ```
pub fn content_range_start(content_range: Option<&str>) -> Option<u64> {
    let (unit, range) = content_range?.trim().split_once(' ')?;
    if !unit.eq_ignore_ascii_case("bytes") {
        return None;
    }
    let (start, _) = range.trim_start().split_once('-')?;
    start.trim().parse().ok()
}
