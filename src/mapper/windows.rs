use std::ffi::c_void;
use std::os::windows::io::RawHandle;
use std::ptr;

use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::System::Memory::{
    CreateFileMappingA, MapViewOfFile, UnmapViewOfFile, FILE_MAP_READ,
    MEMORY_MAPPED_VIEW_ADDRESS, PAGE_READONLY,
};
use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

use crate::err::ErrCode;

pub type Descriptor = RawHandle;

/// The view alone is not enough on Windows: the file-mapping object must
/// be closed after the view is unmapped.
#[derive(Debug)]
pub struct MapHandle {
    file_mapping: HANDLE,
}

pub(crate) fn query_page_size() -> usize {
    // View offsets must be multiples of the allocation granularity,
    // which is coarser than the CPU page.
    let mut info: SYSTEM_INFO = unsafe { std::mem::zeroed() };
    unsafe { GetSystemInfo(&mut info) };
    info.dwAllocationGranularity as usize
}

pub(crate) fn map(
    handle: Descriptor,
    aligned_start: u64,
    span: usize,
) -> Result<(*mut u8, MapHandle), ErrCode> {
    let file = handle as HANDLE;
    if file == INVALID_HANDLE_VALUE {
        return Err(ErrCode::last_error());
    }

    // Maximum size 0 sizes the mapping object to the current file size.
    let file_mapping =
        unsafe { CreateFileMappingA(file, ptr::null(), PAGE_READONLY, 0, 0, ptr::null()) };
    if file_mapping.is_null() {
        return Err(ErrCode::last_error());
    }

    let view = unsafe {
        MapViewOfFile(
            file_mapping,
            FILE_MAP_READ,
            (aligned_start >> 32) as u32,
            aligned_start as u32,
            span,
        )
    };
    if view.Value.is_null() {
        let ec = ErrCode::last_error();
        unsafe { CloseHandle(file_mapping) };
        return Err(ec);
    }

    Ok((view.Value as *mut u8, MapHandle { file_mapping }))
}

pub(crate) unsafe fn unmap(base: *mut u8, _span: usize, handle: &mut MapHandle) {
    UnmapViewOfFile(MEMORY_MAPPED_VIEW_ADDRESS {
        Value: base as *mut c_void,
    });
    CloseHandle(handle.file_mapping);
}
