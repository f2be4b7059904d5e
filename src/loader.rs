use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::slice;

use log::warn;

use crate::alloc::allocate;
use crate::err::MapError;
use crate::mapper;
use crate::region::MappedFile;
use crate::{MAX_READ_CHUNK, MIN_ALIGNMENT};

/// Produce `length` bytes of `source` starting at the stream's current
/// position.
///
/// When `allow_mapping` holds and the position is a multiple of
/// [`MIN_ALIGNMENT`], the bytes come from a live mapping obtained through
/// an independently opened descriptor; otherwise they are read into an
/// aligned buffer in chunks of at most [`MAX_READ_CHUNK`]. Both paths
/// yield byte-identical content and leave the stream advanced past the
/// consumed range. A mapping attempt that cannot be honored is logged and
/// falls back to the buffered path; a short read on the buffered path
/// destroys the partial buffer and fails with [`MapError::Read`].
pub fn load<S>(
    stream: &mut S,
    allow_mapping: bool,
    source: &Path,
    length: usize,
) -> Result<MappedFile, MapError>
where
    S: Read + Seek,
{
    let position = stream
        .stream_position()
        .map_err(|e| read_error(0, 0, source, e))?;

    if allow_mapping {
        if position % MIN_ALIGNMENT as u64 == 0 {
            match try_map(stream, position, source, length) {
                Ok(file) => return Ok(file),
                Err(err) => {
                    warn!(
                        "mapping {length} bytes of {source:?} at offset {position} \
                         could not be honored, reading instead: {err}"
                    );
                    // The attempt may have moved the stream.
                    stream
                        .seek(SeekFrom::Start(position))
                        .map_err(|e| read_error(length, position, source, e))?;
                }
            }
        } else {
            warn!(
                "offset {position} of {source:?} is not {MIN_ALIGNMENT}-byte aligned, \
                 reading instead"
            );
        }
    }

    read_into_buffer(stream, source, length)
}

/// The zero-copy path: map `source` at `position` through a fresh
/// descriptor, then advance the stream past the mapped range and verify
/// where it landed. Any failure here is recoverable by the caller.
fn try_map<S>(
    stream: &mut S,
    position: u64,
    source: &Path,
    length: usize,
) -> Result<MappedFile, MapError>
where
    S: Read + Seek,
{
    let file = File::open(source).map_err(|e| read_error(length, position, source, e))?;
    let region = mapper::map_file(&file, position, length)?;
    drop(file);

    let expected = position + length as u64;
    stream
        .seek(SeekFrom::Start(expected))
        .map_err(|e| read_error(length, position, source, e))?;
    let actual = stream
        .stream_position()
        .map_err(|e| read_error(length, position, source, e))?;
    if actual != expected {
        return Err(MapError::SeekVerification { expected, actual });
    }

    Ok(MappedFile::from_region(region))
}

/// The buffered fallback: an owned aligned buffer filled by bounded
/// chunked reads. The partially filled region is destroyed on any short
/// read; no partial handle ever escapes.
fn read_into_buffer<S>(
    stream: &mut S,
    source: &Path,
    length: usize,
) -> Result<MappedFile, MapError>
where
    S: Read + Seek,
{
    let mut region = allocate(length, MIN_ALIGNMENT)?;
    if length == 0 {
        return Ok(MappedFile::from_region(region));
    }

    let buffer = unsafe { slice::from_raw_parts_mut(region.as_mut_ptr(), length) };
    let mut filled = 0;
    while filled < length {
        let chunk = (length - filled).min(MAX_READ_CHUNK);
        // Position is only reported on failure; best effort.
        let offset = stream.stream_position().unwrap_or(0);
        stream
            .read_exact(&mut buffer[filled..filled + chunk])
            .map_err(|e| read_error(chunk, offset, source, e))?;
        filled += chunk;
    }
    Ok(MappedFile::from_region(region))
}

fn read_error(requested: usize, offset: u64, source: &Path, err: io::Error) -> MapError {
    MapError::Read {
        requested,
        offset,
        path: source.to_path_buf(),
        source: err,
    }
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;
    use std::path::PathBuf;

    use super::*;
    use crate::region::Backing;

    fn write_source(name: &str, content: &[u8]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn reader_at(path: &Path, position: u64) -> BufReader<File> {
        let mut reader = BufReader::new(File::open(path).unwrap());
        reader.seek(SeekFrom::Start(position)).unwrap();
        reader
    }

    #[test]
    fn test_mapping_path_at_start() {
        let content = b"forty-three bytes of plain ascii content...";
        assert_eq!(content.len(), 43);
        let (_dir, path) = write_source("t.bin", content);

        let mut stream = reader_at(&path, 0);
        let file = load(&mut stream, true, &path, 43).unwrap();
        assert_eq!(file.as_bytes(), content);
        assert!(matches!(file.region().backing(), Backing::Mapped(_)));
        assert_eq!(stream.stream_position().unwrap(), 43);
    }

    #[test]
    fn test_buffered_path_at_start() {
        let content = b"forty-three bytes of plain ascii content...";
        let (_dir, path) = write_source("t.bin", content);

        let mut stream = reader_at(&path, 0);
        let file = load(&mut stream, false, &path, 43).unwrap();
        assert_eq!(file.as_bytes(), content);
        assert!(matches!(file.region().backing(), Backing::Owned { .. }));
        assert_eq!(stream.stream_position().unwrap(), 43);
    }

    #[test]
    fn test_paths_are_equivalent_at_aligned_position() {
        let content: Vec<u8> = (0..96).map(|i| (i * 7) as u8).collect();
        let (_dir, path) = write_source("data.bin", &content);

        let mut mapped_stream = reader_at(&path, 32);
        let mapped = load(&mut mapped_stream, true, &path, 48).unwrap();

        let mut read_stream = reader_at(&path, 32);
        let read = load(&mut read_stream, false, &path, 48).unwrap();

        assert!(matches!(mapped.region().backing(), Backing::Mapped(_)));
        assert!(matches!(read.region().backing(), Backing::Owned { .. }));
        assert_eq!(mapped.as_bytes(), read.as_bytes());
        assert_eq!(mapped.as_bytes(), &content[32..80]);
        assert_eq!(
            mapped_stream.stream_position().unwrap(),
            read_stream.stream_position().unwrap()
        );
    }

    #[test]
    fn test_unaligned_position_falls_back() {
        let content = b"unaligned positions must go through the buffer";
        let (_dir, path) = write_source("data.bin", content);

        let mut stream = reader_at(&path, 7);
        let file = load(&mut stream, true, &path, 12).unwrap();
        assert_eq!(file.as_bytes(), &content[7..19]);
        assert!(matches!(file.region().backing(), Backing::Owned { .. }));
    }

    #[test]
    fn test_truncated_source_fails_cleanly() {
        let (_dir, path) = write_source("short.bin", b"ten bytes.");

        let mut stream = reader_at(&path, 0);
        let err = load(&mut stream, false, &path, 43).unwrap_err();
        assert!(matches!(err, MapError::Read { requested: 43, .. }));
    }

    #[test]
    fn test_zero_length_is_empty_on_both_paths() {
        let (_dir, path) = write_source("data.bin", b"content");

        for allow_mapping in [true, false] {
            let mut stream = reader_at(&path, 0);
            let file = load(&mut stream, allow_mapping, &path, 0).unwrap();
            assert!(file.is_empty());
            assert_eq!(file.as_bytes(), &[] as &[u8]);
        }
    }

    #[test]
    fn test_missing_source_falls_back_to_stream() {
        // The independent open fails, but the stream itself still has
        // the bytes.
        let content = b"the stream outlives the path";
        let (dir, path) = write_source("gone.bin", content);
        let mut stream = reader_at(&path, 0);
        std::fs::remove_file(&path).unwrap();
        drop(dir);

        let file = load(&mut stream, true, &path, content.len()).unwrap();
        assert_eq!(file.as_bytes(), content);
        assert!(matches!(file.region().backing(), Backing::Owned { .. }));
    }
}
