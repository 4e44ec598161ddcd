//! A `BufferedReader` is a super-powered `Read`er.
//!
//! Like [`std::io::BufRead`], a `BufferedReader` exposes its internal
//! buffer directly to the user. Unlike `BufRead`, the caller controls
//! the size of that buffer at read time (not open time), which is what
//! lets a packet parser peek at a length header, decide how many bytes
//! the body needs, and ask for exactly that much without falling back
//! to an auxiliary buffer.
//!
//! The trait also standardizes a push-down stack: a `BufferedReader`
//! wraps another `BufferedReader` (`into_inner`), so filters -- armor
//! decoding, decompression, decryption -- can be layered on top of a
//! byte source and later popped back off, draining whatever the filter
//! still had buffered.

use std::cmp;
use std::fmt;
use std::io::{self, Error, ErrorKind, Read};

mod generic;
mod memory;
mod limitor;
mod eof;
mod dup;
#[cfg(feature = "compression-deflate")]
mod decompress_deflate;
#[cfg(feature = "compression-bzip2")]
mod decompress_bzip2;

pub use self::generic::Generic;
pub use self::memory::Memory;
pub use self::limitor::Limitor;
pub use self::eof::EOF;
pub use self::dup::Dup;
#[cfg(feature = "compression-deflate")]
pub use self::decompress_deflate::{Deflate, Zlib};
#[cfg(feature = "compression-bzip2")]
pub use self::decompress_bzip2::Bzip;

/// The default internal buffer size.
pub const DEFAULT_BUF_SIZE: usize = 8 * 1024;

/// The generic `BufferedReader` interface.
///
/// `C` is a "cookie": state that a filter stacks along with the data,
/// e.g. the hashing context a hash-accumulator filter threads through
/// the packet parser.
pub trait BufferedReader<C = ()>: Read + fmt::Debug + Send + Sync {
    /// Returns a reference to the internal buffer.
    ///
    /// This is the same data `self.data(0)` would return, but without
    /// requiring a mutable borrow.
    fn buffer(&self) -> &[u8];

    /// Ensures the internal buffer holds at least `amount` bytes and
    /// returns it.
    ///
    /// The returned slice has at least `amount` bytes unless EOF is
    /// reached or an error occurs, in which case it contains whatever
    /// is left. This does not advance the read cursor; call
    /// `consume()` for that.
    fn data(&mut self, amount: usize) -> io::Result<&[u8]>;

    /// Like [`Self::data`], but returns
    /// `io::ErrorKind::UnexpectedEof` rather than a short read.
    fn data_hard(&mut self, amount: usize) -> io::Result<&[u8]> {
        let got = self.data(amount)?;
        if got.len() < amount {
            return Err(Error::new(ErrorKind::UnexpectedEof,
                                   "unexpected EOF"));
        }
        // Reborrow to satisfy the borrow checker.
        self.data(amount)
    }

    /// Marks `amount` bytes of the internal buffer as read.
    ///
    /// `amount` must be less than or equal to the size of the last
    /// slice returned by `data()`.
    fn consume(&mut self, amount: usize) -> &[u8];

    /// Combines `data()` and `consume()`.
    fn data_consume(&mut self, amount: usize) -> io::Result<&[u8]> {
        let got = self.data(amount)?.len();
        Ok(self.consume(cmp::min(got, amount)))
    }

    /// Combines `data_hard()` and `consume()`: returns exactly
    /// `amount` bytes, copied so the borrow does not outlive the call.
    fn data_consume_hard(&mut self, amount: usize) -> io::Result<Vec<u8>> {
        self.data_hard(amount)?;
        let buf = self.consume(amount);
        Ok(buf[..amount].to_vec())
    }

    /// Reads and consumes `amount` bytes, requiring an exact match.
    fn read_be_u16(&mut self) -> io::Result<u16> {
        let buf = self.data_consume_hard(2)?;
        Ok(u16::from_be_bytes([buf[0], buf[1]]))
    }

    /// Reads a big-endian `u32`.
    fn read_be_u32(&mut self) -> io::Result<u32> {
        let buf = self.data_consume_hard(4)?;
        Ok(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]))
    }

    /// Discards the input until EOF is hit, returning the number of
    /// bytes discarded.
    fn drop_eof(&mut self) -> io::Result<u64> {
        let mut n = 0u64;
        loop {
            let len = self.data(DEFAULT_BUF_SIZE)?.len();
            if len == 0 {
                break;
            }
            self.consume(len);
            n += len as u64;
        }
        Ok(n)
    }

    /// Returns the wrapped `BufferedReader`, if any, consuming `self`.
    fn into_inner<'a>(self: Box<Self>) -> Option<Box<dyn BufferedReader<C> + 'a>>
    where
        Self: 'a;

    /// Returns a mutable reference to the wrapped `BufferedReader`, if
    /// any.
    fn get_mut(&mut self) -> Option<&mut (dyn BufferedReader<C> + 'static)> {
        None
    }

    /// Returns a reference to the wrapped `BufferedReader`, if any.
    fn get_ref(&self) -> Option<&(dyn BufferedReader<C> + 'static)> {
        None
    }

    /// Returns a reference to this filter's cookie.
    fn cookie_ref(&self) -> &C;

    /// Returns a mutable reference to this filter's cookie.
    fn cookie_mut(&mut self) -> &mut C;

    /// Replaces this filter's cookie, returning the old one.
    fn cookie_set(&mut self, cookie: C) -> C;

    /// True if the underlying source is known to be exhausted.
    fn eof(&mut self) -> io::Result<bool> {
        Ok(self.data(1)?.is_empty())
    }
}

/// Boxes any `std::io::Read` as a `BufferedReader`, the common entry
/// point for turning a file, a `TcpStream`, or a `&[u8]` into the
/// bottom of a filter stack.
pub fn buffered_reader<C: Default, R: Read + Send + Sync + 'static>(
    r: R,
) -> Box<dyn BufferedReader<C>> {
    Box::new(Generic::new(r, None))
}
