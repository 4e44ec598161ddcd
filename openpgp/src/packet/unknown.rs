//! Unknown packets.
//!
//! Holds packets with a tag this crate doesn't know how to parse, or
//! that failed to parse for some other reason, so that a message can
//! still be read, re-serialized, or inspected without losing data.

use crate::packet;
use crate::packet::Tag;
use crate::Packet;

/// Holds an unknown packet.
///
/// This is used both for packets with a tag this crate does not
/// recognize, and for packets of a known tag whose body failed to
/// parse; in the latter case [`error`] holds the reason.
///
/// [`error`]: Unknown::error()
#[derive(Debug)]
pub struct Unknown {
    pub(crate) common: packet::Common,
    tag: Tag,
    error: anyhow::Error,
    container: packet::Container,
}

impl Clone for Unknown {
    fn clone(&self) -> Self {
        Unknown {
            common: self.common.clone(),
            tag: self.tag,
            error: anyhow::anyhow!("{}", self.error),
            container: self.container.clone(),
        }
    }
}

impl PartialEq for Unknown {
    fn eq(&self, other: &Unknown) -> bool {
        self.tag == other.tag && self.container == other.container
    }
}

impl Eq for Unknown {}

impl std::hash::Hash for Unknown {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
        self.container.hash(state);
    }
}

impl Unknown {
    /// Creates a new Unknown packet from the original tag and the
    /// reason it could not be parsed into that tag's packet type.
    pub fn new(tag: Tag, error: anyhow::Error) -> Self {
        Unknown {
            common: Default::default(),
            tag,
            error,
            container: packet::Container::default(),
        }
    }

    /// Returns the tag this packet was parsed as, or attempted to be
    /// parsed as.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the reason this packet could not be parsed.
    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    /// Replaces the reason this packet could not be parsed.
    pub fn set_error(&mut self, error: anyhow::Error) -> anyhow::Error {
        std::mem::replace(&mut self.error, error)
    }
}

impl_body_forwards!(Unknown);

impl From<Unknown> for Packet {
    fn from(s: Unknown) -> Self {
        Packet::Unknown(s)
    }
}
