//! Synchronous stream interfaces (§6.1) and the concrete adapters built on
//! top of them: in-memory (`SliceInputStream`/`VecOutputStream`) and file
//! (`FileInputStream`/`FileOutputStream`).

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ellis_core::Error;

/// A source a codec can be driven against: hands out borrowed readable
/// regions, and accepts notice that some trailing bytes of the
/// most-recently-returned region went unconsumed.
pub trait SyncInputStream {
    fn next_input_buf(&mut self) -> Option<&[u8]>;
    fn put_back(&mut self, bytecount: usize);
    fn take_error(&mut self) -> Option<Error>;
}

/// A sink a codec can be drained into: hands out borrowed writable
/// regions, and is told how many leading bytes of the most-recently
/// returned region were actually filled.
pub trait SyncOutputStream {
    fn next_output_buf(&mut self) -> Option<&mut [u8]>;
    fn emit(&mut self, bytecount: usize) -> bool;
    fn take_error(&mut self) -> Option<Error>;
}

/// Hands out the entire unread remainder of an in-memory slice in one
/// call; `put_back` simply rewinds the cursor.
pub struct SliceInputStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceInputStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SliceInputStream { data, pos: 0 }
    }
}

impl<'a> SyncInputStream for SliceInputStream<'a> {
    fn next_input_buf(&mut self) -> Option<&[u8]> {
        if self.pos >= self.data.len() {
            return None;
        }
        let buf = &self.data[self.pos..];
        self.pos = self.data.len();
        Some(buf)
    }

    fn put_back(&mut self, bytecount: usize) {
        self.pos -= bytecount;
    }

    fn take_error(&mut self) -> Option<Error> {
        None
    }
}

/// Accumulates emitted bytes into an owned `Vec<u8>` through a reusable
/// scratch buffer.
pub struct VecOutputStream {
    out: Vec<u8>,
    scratch: Vec<u8>,
}

impl VecOutputStream {
    pub fn new() -> Self {
        VecOutputStream {
            out: Vec::new(),
            scratch: vec![0u8; 8 * 1024],
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.out
    }
}

impl Default for VecOutputStream {
    fn default() -> Self {
        VecOutputStream::new()
    }
}

impl SyncOutputStream for VecOutputStream {
    fn next_output_buf(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.scratch)
    }

    fn emit(&mut self, bytecount: usize) -> bool {
        self.out.extend_from_slice(&self.scratch[..bytecount]);
        true
    }

    fn take_error(&mut self) -> Option<Error> {
        None
    }
}

/// Reads a file through a fixed internal buffer. A `put_back` replays the
/// tail of the buffer already in hand rather than re-reading from disk.
pub struct FileInputStream {
    file: File,
    buf: Vec<u8>,
    len: usize,
    pending_back: usize,
    error: Option<Error>,
}

impl FileInputStream {
    pub fn open(path: impl AsRef<Path>) -> ellis_core::Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(e.to_string()))?;
        Ok(FileInputStream {
            file,
            buf: vec![0u8; 64 * 1024],
            len: 0,
            pending_back: 0,
            error: None,
        })
    }
}

impl SyncInputStream for FileInputStream {
    fn next_input_buf(&mut self) -> Option<&[u8]> {
        if self.pending_back > 0 {
            let n = std::mem::take(&mut self.pending_back);
            return Some(&self.buf[self.len - n..self.len]);
        }
        match self.file.read(&mut self.buf) {
            Ok(0) => None,
            Ok(n) => {
                self.len = n;
                Some(&self.buf[..n])
            }
            Err(e) => {
                tracing::warn!(error = %e, "file input stream read failed");
                self.error = Some(Error::io(e.to_string()));
                None
            }
        }
    }

    fn put_back(&mut self, bytecount: usize) {
        self.pending_back = bytecount;
    }

    fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }
}

/// Writes a file through a fixed internal buffer: the codec fills it via
/// `next_output_buf`, `emit` flushes the filled prefix straight to disk.
pub struct FileOutputStream {
    file: File,
    buf: Vec<u8>,
    error: Option<Error>,
}

impl FileOutputStream {
    pub fn create(path: impl AsRef<Path>) -> ellis_core::Result<Self> {
        let file = File::create(path).map_err(|e| Error::io(e.to_string()))?;
        Ok(FileOutputStream {
            file,
            buf: vec![0u8; 64 * 1024],
            error: None,
        })
    }
}

impl SyncOutputStream for FileOutputStream {
    fn next_output_buf(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.buf)
    }

    fn emit(&mut self, bytecount: usize) -> bool {
        match self.file.write_all(&self.buf[..bytecount]) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "file output stream write failed");
                self.error = Some(Error::io(e.to_string()));
                false
            }
        }
    }

    fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[test]
    fn slice_input_stream_hands_out_remainder_then_none() {
        let data = b"hello world";
        let mut s = SliceInputStream::new(data);
        let buf = s.next_input_buf().unwrap();
        assert_eq!(buf, data);
        assert!(s.next_input_buf().is_none());
    }

    #[test]
    fn slice_input_stream_put_back_replays_tail() {
        let data = b"hello world";
        let mut s = SliceInputStream::new(data);
        let first = s.next_input_buf().unwrap().to_vec();
        assert_eq!(first, data);
        s.put_back(6); // "world" plus the space was not consumed
        let second = s.next_input_buf().unwrap();
        assert_eq!(second, b" world");
        assert!(s.next_input_buf().is_none());
    }

    #[test]
    fn vec_output_stream_accumulates_emitted_bytes() {
        let mut s = VecOutputStream::new();
        {
            let buf = s.next_output_buf().unwrap();
            buf[..5].copy_from_slice(b"hello");
        }
        assert!(s.emit(5));
        assert_eq!(s.into_inner(), b"hello".to_vec());
    }

    #[test]
    fn file_streams_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.bin");

        let mut out = FileOutputStream::create(&path).unwrap();
        {
            let buf = out.next_output_buf().unwrap();
            buf[..11].copy_from_slice(b"hello file!");
        }
        assert!(out.emit(11));
        drop(out);

        let mut contents = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"hello file!".to_vec());

        let mut input = FileInputStream::open(&path).unwrap();
        let buf = input.next_input_buf().unwrap().to_vec();
        assert_eq!(buf, b"hello file!".to_vec());
        assert!(input.next_input_buf().is_none());
    }

    #[test]
    fn file_input_stream_put_back_replays_without_rereading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("putback.bin");
        std::fs::write(&path, b"abcdef").unwrap();

        let mut input = FileInputStream::open(&path).unwrap();
        let buf = input.next_input_buf().unwrap().to_vec();
        assert_eq!(buf, b"abcdef".to_vec());
        input.put_back(3);
        let replayed = input.next_input_buf().unwrap();
        assert_eq!(replayed, b"def");
        assert!(input.next_input_buf().is_none());
    }
}
