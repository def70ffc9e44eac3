use derive_more::Display;
use serde::{Deserialize, Serialize};
use tessera_core::{
    db::{index::SortError, query::CursorError},
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
    value::ValueError,
};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation)
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::Validation => ErrorKind::Validation,
            ErrorClass::Backend => ErrorKind::Backend,
            ErrorClass::Corruption | ErrorClass::InvariantViolation => ErrorKind::Corruption,
            ErrorClass::Unsupported => ErrorKind::Unsupported,
            ErrorClass::Internal => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

// Caller-input errors raised while decoding wire forms.
macro_rules! impl_from_input_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Error {
                fn from(err: $ty) -> Self {
                    InternalError::from(err).into()
                }
            }
        )*
    };
}

impl_from_input_error!(CursorError, SortError, ValueError);

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Malformed input; nothing was read or written.
    Validation,

    /// The storage backend failed; the operation had no effect.
    Backend,

    /// Stored bytes or index entries are inconsistent.
    Corruption,

    Unsupported,

    /// The caller cannot remediate this.
    Internal,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Index,
    Key,
    Query,
    Serialize,
    Store,
    Value,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Index => Self::Index,
            CoreErrorOrigin::Key => Self::Key,
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Serialize => Self::Serialize,
            CoreErrorOrigin::Store => Self::Store,
            CoreErrorOrigin::Value => Self::Value,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_classes_map_to_public_kinds() {
        let err: Error = InternalError::new(
            ErrorClass::InvariantViolation,
            CoreErrorOrigin::Index,
            "dangling entry",
        )
        .into();

        assert_eq!(err.kind, ErrorKind::Corruption);
        assert_eq!(err.origin, ErrorOrigin::Index);
        assert_eq!(err.to_string(), "dangling entry");
        assert_eq!(ErrorKind::Backend.to_string(), "Backend");
    }
}
