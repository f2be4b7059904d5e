use std::os::unix::io::RawFd;
use std::ptr;

use crate::err::ErrCode;

pub type Descriptor = RawFd;

/// Unix keeps no state beyond the view itself; `munmap` only needs the
/// base and span the region already holds.
#[derive(Debug)]
pub struct MapHandle;

pub(crate) fn query_page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

pub(crate) fn map(
    fd: Descriptor,
    aligned_start: u64,
    span: usize,
) -> Result<(*mut u8, MapHandle), ErrCode> {
    match unsafe {
        libc::mmap(
            ptr::null_mut(),
            span,
            libc::PROT_READ,
            libc::MAP_SHARED,
            fd,
            aligned_start as libc::off_t,
        )
    } {
        libc::MAP_FAILED => Err(ErrCode::last_error()),
        base => Ok((base as *mut u8, MapHandle)),
    }
}

pub(crate) unsafe fn unmap(base: *mut u8, span: usize, _handle: &mut MapHandle) {
    libc::munmap(base as *mut libc::c_void, span);
}
