use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Direction
///
/// Canonical direction shared by sort descriptors, key encoding and backend
/// scans.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parse the descriptor spelling (`"asc"` / `"desc"`).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub(crate) const fn to_u8(self) -> u8 {
        match self {
            Self::Asc => 0,
            Self::Desc => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
