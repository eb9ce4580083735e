//! Channel identifiers. The direction lives in the type; the index is the
//! position in the target's control block, resolved upstream.

use std::fmt;

/// Host→target channel index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DownChannel(pub u32);

/// Target→host channel index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UpChannel(pub u32);

impl DownChannel {
    /// The only down channel backed by the ingress ring.
    pub const PRIMARY: Self = Self(0);

    pub const fn is_served(self) -> bool {
        self.0 == Self::PRIMARY.0
    }
}

impl UpChannel {
    /// The only up channel forwarded to the transport.
    pub const PRIMARY: Self = Self(0);

    pub const fn is_served(self) -> bool {
        self.0 == Self::PRIMARY.0
    }
}

impl From<u32> for DownChannel {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl From<u32> for UpChannel {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for DownChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "down#{}", self.0)
    }
}

impl fmt::Display for UpChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "up#{}", self.0)
    }
}
