//! Pure helpers for the transfer algorithm.
//!
//! No I/O happens here; the effects layer calls into these functions.

mod progress;
mod range;

pub use progress::{UNKNOWN_PROGRESS, percent};
pub use range::{
    CHUNK_SIZE, PARTIAL_CONTENT, RANGE_NOT_SATISFIABLE, accepts_byte_ranges, content_range_start,
    is_success, range_header,
};
