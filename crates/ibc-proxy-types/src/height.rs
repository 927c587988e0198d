//! # Height
//!
//! Total order over chain progress: `(revision_number, revision_height)`
//! compared lexicographically. The zero height marks "uninitialized".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TypesError;

/// A chain height within a revision.
///
/// Field order matters: the derived `Ord` compares the revision first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Height {
    /// Revision (chain upgrade epoch).
    pub revision_number: u64,
    /// Block height inside the revision.
    pub revision_height: u64,
}

impl Height {
    /// Create a new height.
    pub const fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }

    /// The uninitialized height.
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Whether this is the uninitialized height.
    pub fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }

    /// Next height in the same revision.
    pub fn increment(&self) -> Self {
        Self::new(self.revision_number, self.revision_height.saturating_add(1))
    }

    /// Previous height in the same revision, `None` at the revision's start.
    pub fn decrement(&self) -> Option<Self> {
        if self.revision_height == 0 {
            return None;
        }
        Some(Self::new(self.revision_number, self.revision_height - 1))
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

impl FromStr for Height {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rev, height) = s
            .split_once('-')
            .ok_or_else(|| TypesError::InvalidHeight(s.to_string()))?;
        let revision_number = rev
            .parse()
            .map_err(|_| TypesError::InvalidHeight(s.to_string()))?;
        let revision_height = height
            .parse()
            .map_err(|_| TypesError::InvalidHeight(s.to_string()))?;
        Ok(Self::new(revision_number, revision_height))
    }
}
