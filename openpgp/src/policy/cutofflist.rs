//! Fixed-size cutoff tables indexed by an algorithm's or packet tag's
//! wire octet.
//!
//! Each table maps every wire value it covers to an `Option<Timestamp>`:
//! `None` ("ACCEPT") means the item is considered safe indefinitely,
//! `Some(Timestamp::UNIX_EPOCH)` ("REJECT") means it is never safe, and
//! any other timestamp is the point after which the item should no
//! longer be trusted. Values outside a table's covered range (e.g. a
//! hash algorithm assigned after this table was written) default to
//! ACCEPT, since we have no evidence against them.

use crate::types::Timestamp;
use crate::{Error, Result};

/// Accept unconditionally: no cutoff.
pub(crate) const ACCEPT: Option<Timestamp> = None;

/// Reject unconditionally: cutoff at the dawn of time.
pub(crate) const REJECT: Option<Timestamp> = Some(Timestamp::UNIX_EPOCH);

/// A table of security cutoffs for some algorithm or packet tag.
pub(crate) trait CutoffList<A> {
    /// Returns the cutoff timestamp for `algo`, if any.
    fn cutoff(&self, algo: A) -> Option<Timestamp>;

    /// Sets the cutoff timestamp for `algo`.
    fn set(&mut self, algo: A, cutoff: Option<Timestamp>);

    /// Returns an error if `algo` is not safe to use at `time`.
    fn check(&self, algo: A, time: Timestamp) -> Result<()>
    where
        A: std::fmt::Display,
    {
        match self.cutoff(algo) {
            None => Ok(()),
            Some(cutoff) if time < cutoff => Ok(()),
            Some(_) => Err(Error::PolicyViolation(
                format!("{} is no longer considered secure", algo)).into()),
        }
    }
}

/// Defines a fixed-size cutoff table for some wire-octet-addressable
/// type.
///
/// `$algo` must implement `Copy + Into<u8>`. Entries beyond `$size`
/// are not representable and default to ACCEPT when queried (and are
/// silently ignored when set).
macro_rules! a_cutoff_list {
    ($name:ident, $algo:ty, $size:expr, [ $($cutoff:expr),+ $(,)? ]) => {
        #[derive(Debug, Clone, Copy)]
        pub(crate) struct $name([Option<crate::types::Timestamp>; $size]);

        impl $name {
            #[allow(non_snake_case)]
            pub(crate) const fn Default() -> Self {
                $name([ $($cutoff),+ ])
            }
        }

        impl crate::policy::cutofflist::CutoffList<$algo> for $name {
            fn cutoff(&self, algo: $algo) -> Option<crate::types::Timestamp> {
                let i = u8::from(algo) as usize;
                self.0.get(i).copied().flatten()
            }

            fn set(&mut self, algo: $algo, cutoff: Option<crate::types::Timestamp>) {
                let i = u8::from(algo) as usize;
                if let Some(slot) = self.0.get_mut(i) {
                    *slot = cutoff;
                }
            }
        }
    };
}
