use crate::error::PvLiveError;
use std::fmt;

/// Identifier of a PES (Public Electricity Supplier) region.
///
/// `0` is the GB-wide aggregate; `1..=327` identify individual
/// distribution regions. Construction validates the range, so every
/// `PesId` that exists is one the API can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PesId(u32);

impl PesId {
    /// The nationwide aggregate region.
    pub const NATIONAL: PesId = PesId(0);

    const MAX: u32 = 327;

    pub fn new(id: u32) -> Result<Self, PvLiveError> {
        if id > Self::MAX {
            Err(PvLiveError::InvalidPesId(id))
        } else {
            Ok(PesId(id))
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_national(self) -> bool {
        self.0 == 0
    }
}

impl Default for PesId {
    fn default() -> Self {
        Self::NATIONAL
    }
}

impl fmt::Display for PesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for PesId {
    type Error = PvLiveError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}
