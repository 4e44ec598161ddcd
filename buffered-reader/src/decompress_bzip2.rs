use std::fmt;
use std::io::{self, Read};

use bzip2::read::BzDecoder;

use crate::BufferedReader;

/// Decompresses a BZIP2 stream (OpenPGP's `BZIP2` compression
/// algorithm).
pub struct Bzip<'a, C> {
    reader: BzDecoder<Box<dyn BufferedReader<C> + 'a>>,
    buffer: Vec<u8>,
    cursor: usize,
    eof: bool,
    cookie: C,
}

impl<'a, C: Default> Bzip<'a, C> {
    /// Wraps `reader` with a BZIP2 decompressor.
    pub fn new(reader: Box<dyn BufferedReader<C> + 'a>) -> Self {
        Bzip {
            reader: BzDecoder::new(reader),
            buffer: Vec::new(),
            cursor: 0,
            eof: false,
            cookie: C::default(),
        }
    }
}

impl<'a, C> fmt::Debug for Bzip<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("buffered_reader::Bzip").finish()
    }
}

impl<'a, C> Read for Bzip<'a, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<'a, C: Default + Send + Sync> BufferedReader<C> for Bzip<'a, C> {
    fn buffer(&self) -> &[u8] {
        &self.buffer[self.cursor..]
    }

    fn data(&mut self, amount: usize) -> io::Result<&[u8]> {
        if self.cursor > 0 {
            self.buffer.drain(..self.cursor);
            self.cursor = 0;
        }
        while self.buffer.len() < amount && !self.eof {
            let mut chunk = [0u8; crate::DEFAULT_BUF_SIZE];
            let n = self.reader.read(&mut chunk)?;
            if n == 0 {
                self.eof = true;
            } else {
                self.buffer.extend_from_slice(&chunk[..n]);
            }
        }
        Ok(&self.buffer[self.cursor..])
    }

    fn consume(&mut self, amount: usize) -> &[u8] {
        assert!(self.cursor + amount <= self.buffer.len());
        self.cursor += amount;
        &self.buffer[self.cursor - amount..self.cursor]
    }

    fn into_inner<'b>(self: Box<Self>) -> Option<Box<dyn BufferedReader<C> + 'b>>
    where
        Self: 'b,
    {
        Some(self.reader.into_inner())
    }

    fn cookie_ref(&self) -> &C {
        &self.cookie
    }

    fn cookie_mut(&mut self) -> &mut C {
        &mut self.cookie
    }

    fn cookie_set(&mut self, cookie: C) -> C {
        std::mem::replace(&mut self.cookie, cookie)
    }
}
