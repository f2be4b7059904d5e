//! Uniform memory regions backed by aligned buffers or read-only file
//! mappings.
//!
//! A [`Region`] describes one contiguous byte range and how it is backed:
//! an allocation it owns, a view into a live file mapping, or memory
//! managed elsewhere. [`MappedFile`] is the single-owner handle around
//! one region. The primary entry point is [`load`], which hands back the
//! requested bytes either through the zero-copy mapping path or through a
//! buffered read that is indistinguishable to the caller.

mod alloc;
mod err;
mod loader;
mod mapper;
mod region;

pub use self::alloc::allocate;
pub use self::err::MapError;
pub use self::loader::load;
pub use self::mapper::{map_descriptor, map_file, page_size, Descriptor, MapHandle};
pub use self::region::{Backing, MappedFile, Region};

/// Alignment of every owned buffer, and the divisor a stream position
/// must satisfy before the zero-copy path is attempted.
pub const MIN_ALIGNMENT: usize = 16;

/// Upper bound on a single read issued by the buffered fallback.
pub const MAX_READ_CHUNK: usize = 256 * 1024 * 1024;
