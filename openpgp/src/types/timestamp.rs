use std::convert::TryFrom;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A 32-bit OpenPGP timestamp: seconds since the Unix epoch.
///
/// All OpenPGP creation/expiration times on the wire are 32-bit, so
/// this type is the single conversion point between `SystemTime` and
/// the wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u32);

impl Timestamp {
    /// Returns the current time, truncated to whole seconds.
    pub fn now() -> Self {
        Self::try_from(SystemTime::now()).unwrap_or(Timestamp(0))
    }

    /// Returns the raw 32-bit value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Timestamp {
    fn from(t: u32) -> Self {
        Timestamp(t)
    }
}

impl From<Timestamp> for u32 {
    fn from(t: Timestamp) -> Self {
        t.0
    }
}

impl TryFrom<SystemTime> for Timestamp {
    type Error = anyhow::Error;

    fn try_from(t: SystemTime) -> Result<Self, Self::Error> {
        let d = t.duration_since(UNIX_EPOCH)
            .map_err(|_| anyhow::anyhow!("time before the Unix epoch"))?;
        Ok(Timestamp(u32::try_from(d.as_secs())
                     .map_err(|_| anyhow::anyhow!("time overflows a 32-bit timestamp"))?))
    }
}

impl From<Timestamp> for SystemTime {
    fn from(t: Timestamp) -> Self {
        UNIX_EPOCH + Duration::from_secs(t.0 as u64)
    }
}

impl Timestamp {
    /// The Unix epoch, used as a cutoff that rejects everything.
    pub const UNIX_EPOCH: Timestamp = Timestamp(0);
    /// 1997-01-01, predating essentially every OpenPGP key still in
    /// active use; a floor for "this algorithm is too old to trust
    /// even for historical signatures".
    pub const Y1997: Timestamp = Timestamp(852076800);
    /// 2004-01-01.
    pub const Y2004: Timestamp = Timestamp(1072915200);
    /// 2013-01-01.
    pub const Y2013: Timestamp = Timestamp(1356998400);
    /// 2020-01-01.
    pub const Y2020: Timestamp = Timestamp(1577836800);
    /// The largest representable timestamp, used as a cutoff that
    /// never excludes anything.
    pub const MAX: Timestamp = Timestamp(u32::MAX);
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
