//! Core engine for Tessera: the document value model, composite key codec,
//! diff engine, index maintenance and the `Db` collection handle.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod hash;
pub mod obs;
pub mod serialize;
pub mod value;

///
/// CONSTANTS
///

/// Reserved pseudo-field naming the document id in sorts and cursors.
pub use db::index::ID_FIELD;

/// Version of the on-disk key and row layout.
///
/// Bumped together with `hash::FANOUT_HASH_VERSION` or any change to the key
/// codec; stores written under another version must be rebuilt.
pub const STORAGE_FORMAT_VERSION: u8 = 1;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, backends internals, or serializers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            Db, Direction, WriteReport,
            backend::{Backend, MemoryBackend},
            diff::{Delta, EntryRef, compute_delta},
            index::{SortField, SortSpec},
            query::{Entry, RangeOptions},
        },
        value::{Document, FieldValue, Number, Scalar},
    };
}
