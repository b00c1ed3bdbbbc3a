//! Positioned reads over any `Read + Seek` stream, files and in-memory
//! segments alike.
//!
//! Typed big/little-endian reads come from [`binrw::BinReaderExt`]
//! (`read_be`/`read_le`); this trait adds the string and search helpers the
//! container needs.

use std::io::{Read, Seek, SeekFrom};

use binrw::BinReaderExt;

pub trait ReaderExt {
    /// Reads `len` bytes and interprets them as (lossy) UTF-8.
    fn read_fixed_string(&mut self, len: usize) -> std::io::Result<String>;

    /// String prefixed with a big-endian `u16` length.
    fn read_pascal_string(&mut self) -> binrw::BinResult<String>;

    /// String prefixed with a big-endian `u32` length.
    fn read_long_pascal_string(&mut self) -> binrw::BinResult<String>;

    /// Reads exactly `len` bytes starting at `offset` into a new buffer.
    fn load_segment(&mut self, offset: u64, len: usize) -> std::io::Result<Vec<u8>>;

    /// Scans forward from the current position for `pattern`.
    ///
    /// Returns the absolute offset of the first match. The stream position
    /// afterwards is unspecified.
    fn find(&mut self, pattern: &[u8]) -> std::io::Result<Option<u64>>;

    fn total_len(&mut self) -> std::io::Result<u64>;
}

impl<R> ReaderExt for R
where
    R: Read + Seek,
{
    fn read_fixed_string(&mut self, len: usize) -> std::io::Result<String> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn read_pascal_string(&mut self) -> binrw::BinResult<String> {
        let len: u16 = self.read_be()?;
        Ok(self.read_fixed_string(len as usize)?)
    }

    fn read_long_pascal_string(&mut self) -> binrw::BinResult<String> {
        let len: u32 = self.read_be()?;
        Ok(self.read_fixed_string(len as usize)?)
    }

    fn load_segment(&mut self, offset: u64, len: usize) -> std::io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.seek(SeekFrom::Start(offset))?;
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn find(&mut self, pattern: &[u8]) -> std::io::Result<Option<u64>> {
        if pattern.is_empty() {
            return self.stream_position().map(Some);
        }

        const CHUNK_SIZE: usize = 0x10000;
        let mut window_start = self.stream_position()?;
        let mut window: Vec<u8> = Vec::with_capacity(CHUNK_SIZE + pattern.len());
        let mut chunk = vec![0u8; CHUNK_SIZE];

        loop {
            let read = self.read(&mut chunk)?;
            if read == 0 {
                return Ok(None);
            }
            window.extend_from_slice(&chunk[..read]);

            if let Some(pos) = window.windows(pattern.len()).position(|w| w == pattern) {
                return Ok(Some(window_start + pos as u64));
            }

            // Keep the tail in case a match straddles two reads
            let keep = window.len().min(pattern.len() - 1);
            let drop = window.len() - keep;
            window.drain(..drop);
            window_start += drop as u64;
        }
    }

    fn total_len(&mut self) -> std::io::Result<u64> {
        let pos = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;
        if pos != len {
            self.seek(SeekFrom::Start(pos))?;
        }
        Ok(len)
    }
}
