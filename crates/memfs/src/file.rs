//! File nodes and the handles that drive them.
//!
//! A [`File`] is both the tree node and the handle returned by
//! [`FileSystem::create`](crate::FileSystem::create) and
//! [`FileSystem::open`](crate::FileSystem::open). Clones share everything,
//! including the cursor: two opens of the same path read and write through
//! one position. The cursor rewinds to the start when the last live handle
//! closes, so a later open reads from the beginning.
//!
//! # Locking
//!
//! Content, cursor, name and modification time sit behind a per-file
//! `parking_lot::Mutex`. Handle operations take only that lock and never the
//! tree lock, so they can run while the tree is being mutated elsewhere. The
//! filesystem takes the file lock only while already holding the tree lock
//! (rename, create's truncation, stat), never the other way around.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::error::{FsError, FsErrorKind, FsResult, Operation};
use crate::node::FsNode;
use crate::types::Whence;

#[derive(Debug)]
struct FileState {
    name: String,
    content: Vec<u8>,
    /// May be past the end of `content`; the next write zero-fills the gap.
    position: i64,
    /// Live handles from create/open not yet closed.
    handles: usize,
    updated_at: SystemTime,
}

#[derive(Debug)]
struct FileInner {
    state: Mutex<FileState>,
    created_at: SystemTime,
    /// Owning filesystem's open-handle counter.
    open_files: Arc<AtomicUsize>,
}

/// A file in the tree, and a handle to it.
#[derive(Debug, Clone)]
pub struct File {
    inner: Arc<FileInner>,
}

impl File {
    pub(crate) fn new(name: impl Into<String>, open_files: Arc<AtomicUsize>) -> Self {
        let now = SystemTime::now();
        Self {
            inner: Arc::new(FileInner {
                state: Mutex::new(FileState {
                    name: name.into(),
                    content: Vec::new(),
                    position: 0,
                    handles: 0,
                    updated_at: now,
                }),
                created_at: now,
                open_files,
            }),
        }
    }

    /// Returns true if both handles refer to the same underlying file.
    pub fn same_file(&self, other: &File) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Current content length in bytes.
    pub fn size(&self) -> usize {
        self.inner.state.lock().content.len()
    }

    /// Current cursor position.
    pub fn position(&self) -> i64 {
        self.inner.state.lock().position
    }

    /// Read from the cursor into `buf`, advancing the cursor.
    ///
    /// Returns `Ok(0)` at end of content.
    pub fn read(&self, buf: &mut [u8]) -> FsResult<usize> {
        let mut state = self.inner.state.lock();
        let len = state.content.len();
        // position is never negative, so the cast only saturates on 32-bit
        let start = usize::try_from(state.position).unwrap_or(usize::MAX);
        if start >= len {
            return Ok(0);
        }

        let n = buf.len().min(len - start);
        buf[..n].copy_from_slice(&state.content[start..start + n]);
        state.position += n as i64;
        trace!(file = %state.name, n, position = state.position, "read");
        Ok(n)
    }

    /// Write `buf` at the cursor, growing content as needed.
    pub fn write(&self, buf: &[u8]) -> FsResult<usize> {
        let mut state = self.inner.state.lock();
        let start = usize::try_from(state.position)
            .map_err(|_| FsError::new(Operation::Write, &state.name, FsErrorKind::InvalidOffset))?;
        let required = start
            .checked_add(buf.len())
            .filter(|&r| i64::try_from(r).is_ok())
            .ok_or_else(|| {
                FsError::new(Operation::Write, &state.name, FsErrorKind::InvalidOffset)
            })?;

        if required > state.content.len() {
            let additional = required - state.content.len();
            state.content.try_reserve_exact(additional).map_err(|_| {
                FsError::new(Operation::Write, &state.name, FsErrorKind::InvalidOffset)
            })?;
            state.content.resize(required, 0);
        }

        state.content[start..required].copy_from_slice(buf);
        state.position = required as i64;
        state.updated_at = SystemTime::now();
        trace!(file = %state.name, n = buf.len(), position = state.position, "write");
        Ok(buf.len())
    }

    /// Move the cursor. Positions past the end are allowed.
    pub fn seek(&self, offset: i64, whence: Whence) -> FsResult<i64> {
        let mut state = self.inner.state.lock();
        let base = match whence {
            Whence::Start => 0,
            Whence::Current => state.position,
            Whence::End => state.content.len() as i64,
        };

        let position = match base.checked_add(offset) {
            Some(p) if p >= 0 => p,
            Some(_) => return Err(FsError::negative_offset(Operation::Seek, &state.name)),
            None => {
                return Err(FsError::new(
                    Operation::Seek,
                    &state.name,
                    FsErrorKind::InvalidOffset,
                ));
            }
        };

        state.position = position;
        Ok(position)
    }

    /// Seek with a numeric whence (0 = start, 1 = current, 2 = end).
    ///
    /// Unknown whence values fail with `NegativeOffset`, the same kind as a
    /// negative result.
    pub fn seek_raw(&self, offset: i64, whence: i32) -> FsResult<i64> {
        match Whence::from_raw(whence) {
            Some(whence) => self.seek(offset, whence),
            None => Err(FsError::negative_offset(Operation::Seek, self.name())),
        }
    }

    /// Resize content to exactly `size` bytes, clamping the cursor.
    pub fn truncate(&self, size: i64) -> FsResult<()> {
        let mut state = self.inner.state.lock();
        if size < 0 {
            return Err(FsError::negative_offset(Operation::Truncate, &state.name));
        }
        let new_len = usize::try_from(size).map_err(|_| {
            FsError::new(Operation::Truncate, &state.name, FsErrorKind::InvalidOffset)
        })?;

        if new_len > state.content.len() {
            let additional = new_len - state.content.len();
            state.content.try_reserve_exact(additional).map_err(|_| {
                FsError::new(Operation::Truncate, &state.name, FsErrorKind::InvalidOffset)
            })?;
        }
        state.content.resize(new_len, 0);
        state.content.shrink_to_fit();
        if state.position > size {
            state.position = size;
        }
        state.updated_at = SystemTime::now();
        Ok(())
    }

    /// Release this handle. Always succeeds.
    ///
    /// Closing the last live handle rewinds the cursor. Double close is not
    /// detected; both counters saturate at zero instead of going negative.
    pub fn close(&self) -> FsResult<()> {
        {
            let mut state = self.inner.state.lock();
            if let Some(remaining) = state.handles.checked_sub(1) {
                state.handles = remaining;
                if remaining == 0 {
                    state.position = 0;
                }
            }
        }

        let prev = self
            .inner
            .open_files
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if prev.is_err() {
            warn!(file = %self.name(), "close with no open handles outstanding");
        }
        Ok(())
    }

    /// Count a new live handle. A file with no live handles starts over at
    /// the beginning.
    pub(crate) fn acquire(&self) {
        let mut state = self.inner.state.lock();
        if state.handles == 0 {
            state.position = 0;
        }
        state.handles += 1;
        self.inner.open_files.fetch_add(1, Ordering::SeqCst);
    }

    /// Empty the file and rewind, as create does for an existing file.
    pub(crate) fn reset(&self) {
        let mut state = self.inner.state.lock();
        state.content = Vec::new();
        state.position = 0;
        state.updated_at = SystemTime::now();
    }

    pub(crate) fn set_name(&self, name: String) {
        self.inner.state.lock().name = name;
    }

    pub(crate) fn content(&self) -> Vec<u8> {
        self.inner.state.lock().content.clone()
    }
}

impl FsNode for File {
    fn name(&self) -> String {
        self.inner.state.lock().name.clone()
    }

    fn is_dir(&self) -> bool {
        false
    }

    fn created_at(&self) -> SystemTime {
        self.inner.created_at
    }

    fn updated_at(&self) -> SystemTime {
        self.inner.state.lock().updated_at
    }
}

impl io::Read for &File {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        File::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Write for &File {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        File::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for &File {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            io::SeekFrom::Start(n) => {
                let n = i64::try_from(n).map_err(|_| {
                    io::Error::from(FsError::new(
                        Operation::Seek,
                        self.name(),
                        FsErrorKind::InvalidOffset,
                    ))
                })?;
                (n, Whence::Start)
            }
            io::SeekFrom::Current(n) => (n, Whence::Current),
            io::SeekFrom::End(n) => (n, Whence::End),
        };
        let position = File::seek(self, offset, whence)?;
        Ok(position as u64)
    }
}

impl io::Read for File {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut &*self, buf)
    }
}

impl io::Write for File {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for File {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        io::Seek::seek(&mut &*self, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read as _, SeekFrom};

    fn new_file() -> (File, Arc<AtomicUsize>) {
        let counter = Arc::new(AtomicUsize::new(0));
        (File::new("test.txt", counter.clone()), counter)
    }

    #[test]
    fn test_write_then_read() {
        let (f, _) = new_file();
        assert_eq!(f.write(b"hello world").unwrap(), 11);
        assert_eq!(f.position(), 11);
        assert_eq!(f.size(), 11);

        f.seek(0, Whence::Start).unwrap();
        let mut buf = [0u8; 5];
        assert_eq!(f.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");
        assert_eq!(f.position(), 5);
    }

    #[test]
    fn test_read_at_end_is_eof() {
        let (f, _) = new_file();
        f.write(b"abc").unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(f.read(&mut buf).unwrap(), 0);

        f.seek(10, Whence::Start).unwrap();
        assert_eq!(f.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_write_past_end_zero_fills() {
        let (f, _) = new_file();
        f.write(b"ab").unwrap();
        f.seek(3, Whence::End).unwrap();
        f.write(b"z").unwrap();
        assert_eq!(f.content(), b"ab\0\0\0z");
    }

    #[test]
    fn test_overwrite_in_middle_keeps_length() {
        let (f, _) = new_file();
        f.write(b"hello world").unwrap();
        f.seek(6, Whence::Start).unwrap();
        f.write(b"WORLD").unwrap();
        assert_eq!(f.content(), b"hello WORLD");

        f.seek(0, Whence::Start).unwrap();
        f.write(b"J").unwrap();
        assert_eq!(f.content(), b"Jello WORLD");
    }

    #[test]
    fn test_seek_variants() {
        let (f, _) = new_file();
        f.write(b"0123456789").unwrap();
        assert_eq!(f.seek(2, Whence::Start).unwrap(), 2);
        assert_eq!(f.seek(3, Whence::Current).unwrap(), 5);
        assert_eq!(f.seek(-1, Whence::End).unwrap(), 9);
        assert_eq!(f.seek(5, Whence::End).unwrap(), 15);
    }

    #[test]
    fn test_seek_negative_fails() {
        let (f, _) = new_file();
        f.write(b"abc").unwrap();
        let err = f.seek(-4, Whence::End).unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::NegativeOffset);
        assert_eq!(err.op, Operation::Seek);
        // cursor untouched on failure
        assert_eq!(f.position(), 3);
    }

    #[test]
    fn test_seek_raw_unknown_whence() {
        let (f, _) = new_file();
        let err = f.seek_raw(0, 7).unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::NegativeOffset);
        assert_eq!(f.seek_raw(0, 2).unwrap(), 0);
    }

    #[test]
    fn test_truncate_shrink_and_grow() {
        let (f, _) = new_file();
        f.write(b"hello world").unwrap();

        f.truncate(5).unwrap();
        assert_eq!(f.content(), b"hello");
        assert_eq!(f.position(), 5);

        f.truncate(8).unwrap();
        assert_eq!(f.content(), b"hello\0\0\0");
        assert_eq!(f.position(), 5);

        let err = f.truncate(-1).unwrap_err();
        assert_eq!(err.kind(), FsErrorKind::NegativeOffset);
    }

    #[test]
    fn test_close_saturates_at_zero() {
        let (f, counter) = new_file();
        counter.store(1, Ordering::SeqCst);
        f.close().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        f.close().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_last_close_rewinds_cursor() {
        let (f, counter) = new_file();
        f.acquire();
        f.acquire();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        f.write(b"abc").unwrap();

        f.close().unwrap();
        assert_eq!(f.position(), 3);
        f.close().unwrap();
        assert_eq!(f.position(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_acquire_without_live_handles_rewinds() {
        let (f, _) = new_file();
        f.write(b"abc").unwrap();
        f.acquire();
        assert_eq!(f.position(), 0);

        f.seek(2, Whence::Start).unwrap();
        f.acquire();
        assert_eq!(f.position(), 2);
    }

    #[test]
    fn test_clones_share_cursor() {
        let (f, _) = new_file();
        let g = f.clone();
        f.write(b"abcdef").unwrap();
        g.seek(0, Whence::Start).unwrap();

        let mut buf = [0u8; 2];
        f.read(&mut buf).unwrap();
        assert_eq!(&buf, b"ab");
        g.read(&mut buf).unwrap();
        assert_eq!(&buf, b"cd");
        assert!(f.same_file(&g));
    }

    #[test]
    fn test_io_traits() {
        let (mut f, _) = new_file();
        std::io::Write::write_all(&mut f, b"through io").unwrap();
        std::io::Seek::seek(&mut f, SeekFrom::Start(0)).unwrap();

        let mut out = String::new();
        f.read_to_string(&mut out).unwrap();
        assert_eq!(out, "through io");

        let err = std::io::Seek::seek(&mut f, SeekFrom::Current(-100)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
