use std::fmt;
use std::io::{self, Read};

use crate::BufferedReader;

/// A `BufferedReader` over an in-memory byte slice.
pub struct Memory<'a, C> {
    buffer: &'a [u8],
    cursor: usize,
    cookie: C,
}

impl<'a> Memory<'a, ()> {
    /// Creates a new reader over `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_cookie(buffer, ())
    }
}

impl<'a, C> Memory<'a, C> {
    /// Creates a new reader over `buffer` with an explicit cookie.
    pub fn with_cookie(buffer: &'a [u8], cookie: C) -> Self {
        Memory { buffer, cursor: 0, cookie }
    }
}

impl<'a, C> fmt::Debug for Memory<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("buffered_reader::Memory")
            .field("remaining", &(self.buffer.len() - self.cursor))
            .finish()
    }
}

impl<'a, C> Read for Memory<'a, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = std::cmp::min(buf.len(), self.buffer.len() - self.cursor);
        buf[..n].copy_from_slice(&self.buffer[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }
}

impl<'a, C: Send + Sync> BufferedReader<C> for Memory<'a, C> {
    fn buffer(&self) -> &[u8] {
        &self.buffer[self.cursor..]
    }

    fn data(&mut self, _amount: usize) -> io::Result<&[u8]> {
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
        None
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
