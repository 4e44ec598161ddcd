use std::fmt;
use std::io::{self, Read};

use flate2::read::{DeflateDecoder, ZlibDecoder};

use crate::BufferedReader;

/// Decompresses a raw DEFLATE stream (OpenPGP's `ZIP` compression
/// algorithm).
pub struct Deflate<'a, C> {
    reader: DeflateDecoder<Box<dyn BufferedReader<C> + 'a>>,
    buffer: Vec<u8>,
    cursor: usize,
    eof: bool,
    cookie: C,
}

impl<'a, C: Default> Deflate<'a, C> {
    /// Wraps `reader` with a DEFLATE decompressor.
    pub fn new(reader: Box<dyn BufferedReader<C> + 'a>) -> Self {
        Deflate {
            reader: DeflateDecoder::new(reader),
            buffer: Vec::new(),
            cursor: 0,
            eof: false,
            cookie: C::default(),
        }
    }
}

impl<'a, C> fmt::Debug for Deflate<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("buffered_reader::Deflate").finish()
    }
}

impl<'a, C> Read for Deflate<'a, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

fn fill<'a, C>(d: &mut Deflate<'a, C>, amount: usize) -> io::Result<()> {
    if d.cursor > 0 {
        d.buffer.drain(..d.cursor);
        d.cursor = 0;
    }
    while d.buffer.len() < amount && !d.eof {
        let mut chunk = [0u8; crate::DEFAULT_BUF_SIZE];
        let n = d.reader.read(&mut chunk)?;
        if n == 0 {
            d.eof = true;
        } else {
            d.buffer.extend_from_slice(&chunk[..n]);
        }
    }
    Ok(())
}

impl<'a, C: Default + Send + Sync> BufferedReader<C> for Deflate<'a, C> {
    fn buffer(&self) -> &[u8] {
        &self.buffer[self.cursor..]
    }

    fn data(&mut self, amount: usize) -> io::Result<&[u8]> {
        fill(self, amount)?;
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

/// Decompresses a zlib-wrapped DEFLATE stream (OpenPGP's `ZLIB`
/// compression algorithm).
pub struct Zlib<'a, C> {
    reader: ZlibDecoder<Box<dyn BufferedReader<C> + 'a>>,
    buffer: Vec<u8>,
    cursor: usize,
    eof: bool,
    cookie: C,
}

impl<'a, C: Default> Zlib<'a, C> {
    /// Wraps `reader` with a zlib decompressor.
    pub fn new(reader: Box<dyn BufferedReader<C> + 'a>) -> Self {
        Zlib {
            reader: ZlibDecoder::new(reader),
            buffer: Vec::new(),
            cursor: 0,
            eof: false,
            cookie: C::default(),
        }
    }
}

impl<'a, C> fmt::Debug for Zlib<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("buffered_reader::Zlib").finish()
    }
}

impl<'a, C> Read for Zlib<'a, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<'a, C: Default + Send + Sync> BufferedReader<C> for Zlib<'a, C> {
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
