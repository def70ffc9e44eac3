//! ## Crate layout
//! - `core`: the engine: values, key codec, diff engine, indexes and `Db`.
//! - `error`: the public error type callers match on.
//! - `collection`: a path-bound handle speaking JSON wire forms.
//!
//! The `prelude` module mirrors the surface most callers need.

pub use tessera_core as core;

mod collection;
mod error;

pub use collection::Collection;
pub use error::{Error, ErrorKind, ErrorOrigin};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use tessera_core::{ID_FIELD, STORAGE_FORMAT_VERSION, config::DbConfig};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{Collection, Error, ErrorKind};
    pub use tessera_core::prelude::*;
}
