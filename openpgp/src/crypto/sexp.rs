//! Canonical S-Expression support.
//!
//! Implements enough of the canonical and basic transport encodings
//! from the [S-Expressions] draft to read and write protected
//! private-key files in the "g10" format: a list-and-string tree
//! with an optional display hint on strings.
//!
//! [S-Expressions]: https://people.csail.mit.edu/rivest/Sexp.txt

use std::fmt;

use crate::crypto::mpi::MPI;
use crate::Error;
use crate::Result;

/// A byte string, with an optional display hint.
#[derive(Clone, PartialEq, Eq)]
pub struct String_ {
    data: Box<[u8]>,
    display_hint: Option<Box<[u8]>>,
}

impl fmt::Debug for String_ {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.display_hint {
            Some(h) => write!(f, "[{}]{:?}", String::from_utf8_lossy(h), self.data),
            None => write!(f, "{:?}", self.data),
        }
    }
}

impl From<&[u8]> for String_ {
    fn from(v: &[u8]) -> Self {
        String_ { data: v.into(), display_hint: None }
    }
}

impl From<Vec<u8>> for String_ {
    fn from(v: Vec<u8>) -> Self {
        String_ { data: v.into_boxed_slice(), display_hint: None }
    }
}

impl String_ {
    /// Creates a new string carrying a display hint.
    pub fn with_display_hint(data: Vec<u8>, hint: Vec<u8>) -> Self {
        String_ { data: data.into_boxed_slice(), display_hint: Some(hint.into_boxed_slice()) }
    }

    /// Returns the raw byte string.
    pub fn value(&self) -> &[u8] {
        &self.data
    }

    /// Returns the display hint, if any.
    pub fn display_hint(&self) -> Option<&[u8]> {
        self.display_hint.as_deref()
    }

    /// Interprets this string as an MPI.
    pub fn to_mpi(&self) -> MPI {
        MPI::new(&self.data)
    }
}

/// A parsed S-expression: either an atomic string or a list of
/// S-expressions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sexp {
    /// A string, with an optional display hint.
    String(String_),
    /// A list of zero or more S-expressions.
    List(Vec<Sexp>),
}

impl Sexp {
    /// Parses a canonical S-expression from `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Sexp> {
        let mut p = Parser { data, pos: 0 };
        let sexp = p.parse_one()?;
        if p.pos != p.data.len() {
            return Err(Error::InvalidArgument(
                "trailing data after S-expression".into()).into());
        }
        Ok(sexp)
    }

    /// Returns this S-expression's elements if it is a list.
    pub fn as_list(&self) -> Option<&[Sexp]> {
        match self {
            Sexp::List(l) => Some(l),
            Sexp::String(_) => None,
        }
    }

    /// Returns this S-expression's value if it is a string.
    pub fn as_string(&self) -> Option<&String_> {
        match self {
            Sexp::String(s) => Some(s),
            Sexp::List(_) => None,
        }
    }

    /// Serializes this S-expression in canonical form.
    pub fn serialize(&self, out: &mut Vec<u8>) {
        match self {
            Sexp::String(s) => {
                if let Some(hint) = &s.display_hint {
                    out.push(b'[');
                    out.extend(hint.len().to_string().bytes());
                    out.push(b':');
                    out.extend_from_slice(hint);
                    out.push(b']');
                }
                out.extend(s.data.len().to_string().bytes());
                out.push(b':');
                out.extend_from_slice(&s.data);
            }
            Sexp::List(items) => {
                out.push(b'(');
                for item in items {
                    item.serialize(out);
                }
                out.push(b')');
            }
        }
    }
}

struct Parser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn parse_len(&mut self) -> Result<usize> {
        let start = self.pos;
        while self.peek().map(|b| b.is_ascii_digit()).unwrap_or(false) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(Error::InvalidArgument(
                "expected a length prefix".into()).into());
        }
        std::str::from_utf8(&self.data[start..self.pos]).unwrap()
            .parse::<usize>()
            .map_err(|e| Error::InvalidArgument(e.to_string()).into())
    }

    fn parse_raw_string(&mut self) -> Result<Box<[u8]>> {
        let len = self.parse_len()?;
        if self.peek() != Some(b':') {
            return Err(Error::InvalidArgument("expected ':'".into()).into());
        }
        self.pos += 1;
        if self.pos + len > self.data.len() {
            return Err(Error::InvalidArgument("truncated string".into()).into());
        }
        let s = self.data[self.pos..self.pos + len].to_vec().into_boxed_slice();
        self.pos += len;
        Ok(s)
    }

    fn parse_one(&mut self) -> Result<Sexp> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let mut items = Vec::new();
                loop {
                    match self.peek() {
                        Some(b')') => { self.pos += 1; break; }
                        Some(_) => items.push(self.parse_one()?),
                        None => return Err(Error::InvalidArgument(
                            "unterminated list".into()).into()),
                    }
                }
                Ok(Sexp::List(items))
            }
            Some(b'[') => {
                self.pos += 1;
                let hint = self.parse_raw_string()?;
                if self.peek() != Some(b']') {
                    return Err(Error::InvalidArgument(
                        "expected ']' after display hint".into()).into());
                }
                self.pos += 1;
                let data = self.parse_raw_string()?;
                Ok(Sexp::String(String_::with_display_hint(data.into_vec(), hint.into_vec())))
            }
            Some(b'0'..=b'9') => {
                let data = self.parse_raw_string()?;
                Ok(Sexp::String(String_ { data, display_hint: None }))
            }
            _ => Err(Error::InvalidArgument(
                "expected '(', '[', or a length prefix".into()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basics() {
        assert_eq!(Sexp::from_bytes(b"()").unwrap(), Sexp::List(vec![]));
        assert_eq!(Sexp::from_bytes(b"2:hi").unwrap(),
                   Sexp::String(b"hi"[..].into()));
        assert_eq!(Sexp::from_bytes(b"[5:fancy]2:hi").unwrap(),
                   Sexp::String(String_::with_display_hint(
                       b"hi".to_vec(), b"fancy".to_vec())));
        assert_eq!(Sexp::from_bytes(b"(2:hi2:ho)").unwrap(),
                   Sexp::List(vec![
                       Sexp::String(b"hi"[..].into()),
                       Sexp::String(b"ho"[..].into()),
                   ]));
        assert!(Sexp::from_bytes(b"").is_err());
        assert!(Sexp::from_bytes(b"(").is_err());
        assert!(Sexp::from_bytes(b"(2:hi").is_err());
        assert!(Sexp::from_bytes(b"(2:hi)(2:hi)").is_err());
    }

    #[test]
    fn roundtrip_through_serialize() {
        let s = Sexp::List(vec![
            Sexp::String(b"sig-val"[..].into()),
            Sexp::List(vec![
                Sexp::String(b"rsa"[..].into()),
                Sexp::List(vec![
                    Sexp::String(b"s"[..].into()),
                    Sexp::String(b"abc"[..].into()),
                ]),
            ]),
        ]);
        let mut out = Vec::new();
        s.serialize(&mut out);
        assert_eq!(Sexp::from_bytes(&out).unwrap(), s);
    }
}
