//! Engine configuration.
//!
//! Limits are enforced at the `Db` boundary before any backend access.

use crate::error::{ErrorOrigin, InternalError};
use serde::Deserialize;
use thiserror::Error as ThisError;

/// Default maximum number of fields in one composite index.
pub const DEFAULT_MAX_INDEX_FIELDS: usize = 4;

/// Default maximum serialized size of one stored document.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 4 * 1024 * 1024;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("max_index_fields must be between 1 and {max}, found {found}")]
    MaxIndexFields { found: usize, max: usize },

    #[error("max_document_bytes must be greater than zero")]
    ZeroDocumentBytes,

    #[error("default_range_limit must be greater than zero")]
    ZeroRangeLimit,
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::validation(ErrorOrigin::Config, err.to_string())
    }
}

///
/// DbConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    /// Maintain `[[f, asc]]` and `[[f, desc]]` entries for every top-level field.
    pub auto_field_indexes: bool,

    pub max_index_fields: usize,

    pub max_document_bytes: usize,

    /// Result cap applied to `range` when the caller passes no `limit`.
    pub default_range_limit: Option<usize>,
}

impl DbConfig {
    /// Hard ceiling for `max_index_fields`; keeps composite keys bounded.
    pub const MAX_INDEX_FIELDS_CEILING: usize = 16;

    /// Parse and validate a TOML config document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_index_fields == 0 || self.max_index_fields > Self::MAX_INDEX_FIELDS_CEILING {
            return Err(ConfigError::MaxIndexFields {
                found: self.max_index_fields,
                max: Self::MAX_INDEX_FIELDS_CEILING,
            });
        }
        if self.max_document_bytes == 0 {
            return Err(ConfigError::ZeroDocumentBytes);
        }
        if self.default_range_limit == Some(0) {
            return Err(ConfigError::ZeroRangeLimit);
        }

        Ok(())
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            auto_field_indexes: true,
            max_index_fields: DEFAULT_MAX_INDEX_FIELDS,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            default_range_limit: None,
        }
    }
}

///
/// TESTS
///
