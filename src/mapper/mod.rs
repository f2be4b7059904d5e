use std::fs::File;
use std::sync::OnceLock;

use crate::err::MapError;
use crate::region::Region;
use crate::MIN_ALIGNMENT;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use self::unix as sys;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use self::windows as sys;

pub use self::sys::MapHandle;
pub(crate) use self::sys::unmap;

/// The platform descriptor a mapping is created from: a raw fd on Unix,
/// a raw file handle on Windows.
pub type Descriptor = sys::Descriptor;

/// Platform page size, queried once per process.
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
    *PAGE_SIZE.get_or_init(sys::query_page_size)
}

/// Distance from the previous page boundary to `position`.
fn page_offset(position: u64) -> usize {
    (position % page_size() as u64) as usize
}

/// Map the smallest page-aligned superset of `length` bytes at
/// `position` of the file behind `descriptor`, read-only.
///
/// The region's visible range starts past the alignment padding, so the
/// caller sees exactly the requested bytes. No file contents are read
/// here; pages are faulted in lazily by the OS.
pub fn map_descriptor(
    descriptor: Descriptor,
    position: u64,
    length: usize,
) -> Result<Region, MapError> {
    let offset = page_offset(position);
    let aligned_start = position - offset as u64;
    let span = length + offset;
    if span == 0 {
        return Ok(Region::empty(MIN_ALIGNMENT));
    }

    let (base, handle) =
        sys::map(descriptor, aligned_start, span).map_err(|ec| MapError::Mapping {
            descriptor: descriptor as isize,
            span,
            start: aligned_start,
            source: ec.into(),
        })?;
    Ok(Region::mapped(base, span, offset, handle))
}

/// [`map_descriptor`] on an open [`File`].
pub fn map_file(file: &File, position: u64, length: usize) -> Result<Region, MapError> {
    #[cfg(unix)]
    use std::os::unix::io::AsRawFd as _;
    #[cfg(windows)]
    use std::os::windows::io::AsRawHandle as _;

    #[cfg(unix)]
    let descriptor = file.as_raw_fd();
    #[cfg(windows)]
    let descriptor = file.as_raw_handle();

    map_descriptor(descriptor, position, length)
}

#[test]
fn test_page_offset() {
    let ps = page_size() as u64;
    assert_eq!(page_offset(0), 0);
    assert_eq!(page_offset(1), 1);
    assert_eq!(page_offset(ps - 1), (ps - 1) as usize);
    assert_eq!(page_offset(ps), 0);
    assert_eq!(page_offset(ps + 1), 1);
}
