use std::cmp;
use std::fmt;
use std::io::{self, Read};

use crate::{BufferedReader, DEFAULT_BUF_SIZE};

/// Wraps any `io::Read` as a `BufferedReader`.
///
/// This is the usual bottom of a filter stack: a file, a `TcpStream`,
/// or an in-memory cursor, fed through `std::io::Read`.
pub struct Generic<T, C> {
    reader: T,
    buffer: Vec<u8>,
    // Offset into `buffer` of unconsumed data.
    cursor: usize,
    // True once `reader` has signalled EOF.
    eof: bool,
    error: Option<io::Error>,
    cookie: C,
}

impl<T, C> fmt::Debug for Generic<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("buffered_reader::Generic")
            .field("buffer_bytes", &(self.buffer.len() - self.cursor))
            .field("eof", &self.eof)
            .finish()
    }
}

impl<T: Read> Generic<T, ()> {
    /// Creates a new `Generic` reader with the default (unit) cookie.
    pub fn new(reader: T, cookie: Option<()>) -> Self {
        Self::with_cookie(reader, cookie.unwrap_or(()))
    }
}

impl<T: Read, C> Generic<T, C> {
    /// Creates a new `Generic` reader with an explicit cookie.
    pub fn with_cookie(reader: T, cookie: C) -> Self {
        Generic {
            reader,
            buffer: Vec::with_capacity(DEFAULT_BUF_SIZE),
            cursor: 0,
            eof: false,
            error: None,
            cookie,
        }
    }

    fn fill(&mut self, amount: usize) -> io::Result<()> {
        if self.cursor > 0 {
            self.buffer.drain(..self.cursor);
            self.cursor = 0;
        }
        while self.buffer.len() < amount && !self.eof {
            if let Some(e) = self.error.take() {
                return Err(e);
            }
            let mut chunk = [0u8; DEFAULT_BUF_SIZE];
            match self.reader.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.error = Some(io::Error::new(e.kind(), e.to_string()));
                    break;
                }
            }
        }
        Ok(())
    }
}

impl<T: Read, C> Read for Generic<T, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fill(buf.len())?;
        let n = cmp::min(buf.len(), self.buffer.len() - self.cursor);
        buf[..n].copy_from_slice(&self.buffer[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }
}

impl<T: Read + Send + Sync, C: Send + Sync> BufferedReader<C> for Generic<T, C> {
    fn buffer(&self) -> &[u8] {
        &self.buffer[self.cursor..]
    }

    fn data(&mut self, amount: usize) -> io::Result<&[u8]> {
        self.fill(amount)?;
        if self.buffer.len() - self.cursor < amount {
            if let Some(e) = self.error.take() {
                return Err(e);
            }
        }
        Ok(&self.buffer[self.cursor..])
    }

    fn consume(&mut self, amount: usize) -> &[u8] {
        assert!(self.cursor + amount <= self.buffer.len());
        self.cursor += amount;
        &self.buffer[self.cursor - amount..self.cursor]
    }

    fn into_inner<'a>(self: Box<Self>) -> Option<Box<dyn BufferedReader<C> + 'a>>
    where
        Self: 'a,
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
