///
/// ValueTag
///
/// Stable canonical value-variant tag used by ordering and key encoding.
///
/// IMPORTANT:
/// Tag values are persisted as the first byte of every encoded key component
/// and define cross-type ordering. Renumbering is a storage-format change.
///

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum ValueTag {
    Null = 1,
    Bool = 2,
    Number = 3,
    Text = 4,
    Array = 5,
}

impl ValueTag {
    /// Stable byte tag for this variant.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Stable 0-based rank used for cross-variant ordering.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.to_u8() - 1
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool => "Bool",
            Self::Number => "Number",
            Self::Text => "Text",
            Self::Array => "Array",
        }
    }
}
