use std::fmt;
use std::io::{self, Read};

use crate::BufferedReader;

/// Wraps a reader without taking ownership, by way of a mutable
/// borrow. Used to run a sub-parser over a stack this call does not
/// own, e.g. while peeking at a nested container's header.
pub struct Dup<'a, C> {
    reader: &'a mut dyn BufferedReader<C>,
}

impl<'a, C> Dup<'a, C> {
    /// Creates a new `Dup` borrowing `reader`.
    pub fn new(reader: &'a mut dyn BufferedReader<C>) -> Self {
        Dup { reader }
    }
}

impl<'a, C> fmt::Debug for Dup<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("buffered_reader::Dup").finish()
    }
}

impl<'a, C> Read for Dup<'a, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<'a, C: Send + Sync> BufferedReader<C> for Dup<'a, C> {
    fn buffer(&self) -> &[u8] {
        self.reader.buffer()
    }

    fn data(&mut self, amount: usize) -> io::Result<&[u8]> {
        self.reader.data(amount)
    }

    fn consume(&mut self, amount: usize) -> &[u8] {
        self.reader.consume(amount)
    }

    fn into_inner<'b>(self: Box<Self>) -> Option<Box<dyn BufferedReader<C> + 'b>>
    where
        Self: 'b,
    {
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
