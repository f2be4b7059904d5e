use std::alloc::{alloc, Layout};

use crate::err::MapError;
use crate::region::Region;

/// Allocate an owned region of `size` bytes aligned to `alignment`.
///
/// `alignment` must be a power of two. A zero `size` yields the valid
/// empty region without touching the allocator. The buffer contents are
/// uninitialized.
pub fn allocate(size: usize, alignment: usize) -> Result<Region, MapError> {
    if !alignment.is_power_of_two() {
        return Err(MapError::Allocation { size, alignment });
    }
    if size == 0 {
        return Ok(Region::empty(alignment));
    }
    let layout = Layout::from_size_align(size, alignment)
        .map_err(|_| MapError::Allocation { size, alignment })?;
    let data = unsafe { alloc(layout) };
    if data.is_null() {
        return Err(MapError::Allocation { size, alignment });
    }
    Ok(Region::owned(data, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Backing;

    #[test]
    fn test_alignment_contract() {
        for &alignment in &[1usize, 2, 4, 8, 16, 64, 4096] {
            for &size in &[1usize, 7, 43, 4096, 10000] {
                let region = allocate(size, alignment).unwrap();
                assert_eq!(region.as_ptr() as usize % alignment, 0);
                assert_eq!(region.len(), size);
                assert_eq!(region.offset(), 0);
                assert!(matches!(region.backing(), Backing::Owned { .. }));
            }
        }
    }

    #[test]
    fn test_non_power_of_two_alignment() {
        assert!(matches!(
            allocate(16, 3),
            Err(MapError::Allocation { size: 16, alignment: 3 })
        ));
        // Rejected even when no allocation would happen.
        assert!(matches!(
            allocate(0, 3),
            Err(MapError::Allocation { size: 0, alignment: 3 })
        ));
    }

    #[test]
    fn test_zero_size_is_external() {
        let region = allocate(0, 16).unwrap();
        assert!(region.is_empty());
        assert!(matches!(region.backing(), Backing::External));
        assert_eq!(region.as_bytes(), &[] as &[u8]);
    }
}
