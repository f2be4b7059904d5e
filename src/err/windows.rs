use std::fmt;
use std::io;

use windows_sys::Win32::Foundation::GetLastError;

/// Last platform error code, carried until it becomes an [`io::Error`].
#[derive(Copy, Clone, Eq, PartialEq)]
pub(crate) struct ErrCode(u32);

impl ErrCode {
    pub fn last_error() -> Self {
        ErrCode(unsafe { GetLastError() })
    }
}

impl fmt::Debug for ErrCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "os error {}", self.0)
    }
}

impl From<ErrCode> for io::Error {
    fn from(ec: ErrCode) -> Self {
        io::Error::from_raw_os_error(ec.0 as i32)
    }
}
