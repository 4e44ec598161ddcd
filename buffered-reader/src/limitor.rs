use std::cmp;
use std::fmt;
use std::io::{self, Read};

use crate::BufferedReader;

/// Limits the amount of data readable from the wrapped reader.
///
/// Used to carve a fixed-length packet body (or a coalesced partial-
/// length body) out of the surrounding stream without the inner
/// parser being able to read past its end.
pub struct Limitor<'a, C> {
    reader: Box<dyn BufferedReader<C> + 'a>,
    remaining: u64,
}

impl<'a, C> Limitor<'a, C> {
    /// Creates a new `Limitor` over `reader`, allowing `limit` more
    /// bytes to be read.
    pub fn new(reader: Box<dyn BufferedReader<C> + 'a>, limit: u64) -> Self {
        Limitor { reader, remaining: limit }
    }

    /// Returns the number of bytes that may still be read.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl<'a, C> fmt::Debug for Limitor<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("buffered_reader::Limitor")
            .field("remaining", &self.remaining)
            .finish()
    }
}

impl<'a, C> Read for Limitor<'a, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = cmp::min(buf.len() as u64, self.remaining) as usize;
        let got = self.reader.read(&mut buf[..n])?;
        self.remaining -= got as u64;
        Ok(got)
    }
}

impl<'a, C: Send + Sync> BufferedReader<C> for Limitor<'a, C> {
    fn buffer(&self) -> &[u8] {
        let buf = self.reader.buffer();
        let n = cmp::min(buf.len() as u64, self.remaining) as usize;
        &buf[..n]
    }

    fn data(&mut self, amount: usize) -> io::Result<&[u8]> {
        let capped = cmp::min(amount as u64, self.remaining) as usize;
        let buf = self.reader.data(capped)?;
        let n = cmp::min(buf.len() as u64, self.remaining) as usize;
        Ok(&buf[..n])
    }

    fn consume(&mut self, amount: usize) -> &[u8] {
        assert!(amount as u64 <= self.remaining);
        self.remaining -= amount as u64;
        self.reader.consume(amount)
    }

    fn into_inner<'b>(self: Box<Self>) -> Option<Box<dyn BufferedReader<C> + 'b>>
    where
        Self: 'b,
    {
        Some(self.reader)
    }

    fn get_mut(&mut self) -> Option<&mut (dyn BufferedReader<C> + 'static)> {
        None
    }

    fn cookie_ref(&self) -> &C {
        self.reader.cookie_ref()
    }

    fn cookie_mut(&mut self) -> &mut C {
        self.reader.cookie_mut()
    }

    fn cookie_set(&mut self, cookie: C) -> C {
        self.reader.cookie_set(cookie)
    }
}
