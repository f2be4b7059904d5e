use std::ffi::CStr;
use std::fmt;
use std::io;

/// Last platform error code, carried until it becomes an [`io::Error`].
#[derive(Copy, Clone, Eq, PartialEq)]
pub(crate) struct ErrCode(i32);

impl ErrCode {
    pub fn last_error() -> Self {
        ErrCode(unsafe { *libc::__errno_location() })
    }
}

impl fmt::Debug for ErrCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = unsafe { CStr::from_ptr(libc::strerror(self.0)) };
        write!(f, "{}", s.to_str().unwrap_or("unknown error"))
    }
}

impl From<ErrCode> for io::Error {
    fn from(ec: ErrCode) -> Self {
        io::Error::from_raw_os_error(ec.0)
    }
}
