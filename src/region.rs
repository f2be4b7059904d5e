use std::alloc::{dealloc, Layout};
use std::fmt;
use std::slice;

use crate::alloc::allocate;
use crate::err::MapError;
use crate::mapper::{self, MapHandle};
use crate::MIN_ALIGNMENT;

/// How a [`Region`]'s memory is sourced, and therefore how it is
/// released. Destruction releases exactly the resource named here,
/// exactly once.
#[derive(Debug)]
pub enum Backing {
    /// An allocation the region exclusively owns.
    Owned { layout: Layout },
    /// A view into a live file mapping, released through the platform
    /// unmap call.
    Mapped(MapHandle),
    /// Memory managed elsewhere. Always zero-sized, never released here.
    External,
}

/// One contiguous byte range plus its backing classification.
///
/// `size` covers the whole backing block; when page-alignment padding was
/// added the visible range starts `offset` bytes in, so callers see
/// exactly the bytes they asked for. `0 <= offset < page_size` holds for
/// mapped regions, and `offset == 0` for owned ones.
pub struct Region {
    data: *mut u8,
    backing: Backing,
    size: usize,
    offset: usize,
}

impl Region {
    pub(crate) fn owned(data: *mut u8, layout: Layout) -> Self {
        Region {
            data,
            backing: Backing::Owned { layout },
            size: layout.size(),
            offset: 0,
        }
    }

    pub(crate) fn mapped(base: *mut u8, span: usize, offset: usize, handle: MapHandle) -> Self {
        Region {
            data: unsafe { base.add(offset) },
            backing: Backing::Mapped(handle),
            size: span,
            offset,
        }
    }

    /// Zero-sized marker over memory managed by some other allocator.
    /// Dropping it takes no release action.
    pub fn external(data: *mut u8) -> Self {
        Region {
            data,
            backing: Backing::External,
            size: 0,
            offset: 0,
        }
    }

    /// The valid empty region. The pointer is dangling but aligned and
    /// never dereferenced.
    pub(crate) fn empty(alignment: usize) -> Self {
        Region::external(alignment.max(1) as *mut u8)
    }

    /// First byte visible to the caller.
    pub fn as_ptr(&self) -> *const u8 {
        self.data
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data
    }

    /// Bytes visible to the caller: the backing block minus padding.
    pub fn len(&self) -> usize {
        self.size - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte length of the whole backing block, padding included.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Padding between the start of the backing block and [`as_ptr`].
    ///
    /// [`as_ptr`]: Self::as_ptr
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn backing(&self) -> &Backing {
        &self.backing
    }

    pub fn as_bytes(&self) -> &[u8] {
        if self.is_empty() {
            &[]
        } else {
            unsafe { slice::from_raw_parts(self.data, self.len()) }
        }
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Region")
            .field("backing", &self.backing)
            .field("size", &self.size)
            .field("offset", &self.offset)
            .finish()
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        match &mut self.backing {
            Backing::Owned { layout } => {
                if layout.size() > 0 {
                    unsafe { dealloc(self.data, *layout) }
                }
            }
            Backing::Mapped(handle) => {
                let base = unsafe { self.data.sub(self.offset) };
                unsafe { mapper::unmap(base, self.size, handle) }
            }
            Backing::External => {}
        }
    }
}

// Content is immutable once a region reaches its owner, and no global
// state is touched; distinct regions may live on distinct threads.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

/// Single-owner handle wrapping exactly one [`Region`]. Dropping it
/// destroys the region; ownership is exclusive, not reference-counted.
#[derive(Debug)]
pub struct MappedFile {
    region: Region,
}

impl MappedFile {
    /// Owned buffer of `size` bytes aligned to [`MIN_ALIGNMENT`].
    pub fn new(size: usize) -> Result<Self, MapError> {
        Self::with_alignment(size, MIN_ALIGNMENT)
    }

    /// Owned buffer with an explicit power-of-two alignment.
    pub fn with_alignment(size: usize, alignment: usize) -> Result<Self, MapError> {
        Ok(Self::from_region(allocate(size, alignment)?))
    }

    pub fn from_region(region: Region) -> Self {
        MappedFile { region }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.region.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }
}
