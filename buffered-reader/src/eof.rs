use std::fmt;
use std::io::{self, Read};

use crate::BufferedReader;

/// A `BufferedReader` that is always at EOF.
///
/// Useful as a sentinel bottom of an empty filter stack, or to
/// represent an already-drained partial-length body.
pub struct EOF<C> {
    cookie: C,
}

impl EOF<()> {
    /// Creates a new, empty reader.
    pub fn new() -> Self {
        EOF { cookie: () }
    }
}

impl Default for EOF<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for EOF<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("buffered_reader::EOF").finish()
    }
}

impl<C> Read for EOF<C> {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl<C: Default + Send + Sync> BufferedReader<C> for EOF<C> {
    fn buffer(&self) -> &[u8] {
        &[]
    }

    fn data(&mut self, _amount: usize) -> io::Result<&[u8]> {
        Ok(&[])
    }

    fn consume(&mut self, amount: usize) -> &[u8] {
        assert_eq!(amount, 0);
        &[]
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
