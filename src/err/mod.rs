use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub(crate) use self::unix::ErrCode;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use self::windows::ErrCode;

/// Failure modes of the region producers.
///
/// Mapping failures are recoverable inside [`load`](crate::load), where
/// they trigger the buffered fallback; raised directly they are fatal to
/// the calling operation. Every failure path releases what it acquired
/// before returning, so no variant leaves a partial region behind.
#[derive(Debug, Error)]
pub enum MapError {
    /// The allocator could not satisfy the request, or the alignment is
    /// not a power of two.
    #[error("cannot allocate {size} bytes aligned to {alignment}")]
    Allocation { size: usize, alignment: usize },

    /// The platform refused to create the mapping or its view.
    #[error("cannot map {span} bytes of descriptor {descriptor} at offset {start}: {source}")]
    Mapping {
        descriptor: isize,
        span: usize,
        start: u64,
        source: io::Error,
    },

    /// A stream operation on the buffered path came up short.
    #[error("failed to read {requested} bytes at offset {offset} from {path:?}: {source}")]
    Read {
        requested: usize,
        offset: u64,
        path: PathBuf,
        source: io::Error,
    },

    /// The stream did not land where a successful mapping put it.
    /// Treated as a mapping failure by the loader, never surfaced.
    #[error("stream at {actual} after mapping, expected {expected}")]
    SeekVerification { expected: u64, actual: u64 },
}

#[test]
fn test_errcode_roundtrip() {
    let err: io::Error = ErrCode::last_error().into();
    assert!(err.raw_os_error().is_some());
}
