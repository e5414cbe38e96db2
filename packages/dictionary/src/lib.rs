#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reference data for Vietnamese administrative unit resolution.
//!
//! Three JSON documents are loaded once and compiled into immutable lookup
//! structures:
//!
//! * `legacy.json` → [`LegacyDictionary`] (63 provinces, districts, wards)
//! * `current.json` → [`CurrentDictionary`] (34 provinces, wards)
//! * `conversion.json` → [`ConversionTable`] (legacy → 2025)
//!
//! Every scope carries a [`KeywordMatcher`] compiled longest keyword first.
//! Loading validates cross references; a failure here is fatal for the
//! caller since nothing can be resolved without the data.

pub mod conversion;
pub mod current;
pub mod document;
pub mod legacy;
pub mod matcher;
pub mod scope;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use conversion::{COMPOSITE_SEPARATOR, ConversionTable, composite_key};
pub use current::CurrentDictionary;
pub use document::{CandidateWard, ConversionDocument, CurrentDocument, Entry, LegacyDocument};
pub use legacy::{DividedDistrictScope, DividedScope, LegacyDictionary, MaskRule};
pub use matcher::{KeywordMatch, KeywordMatcher};
pub use scope::{Scope, TieredScope, UniqueIndex, WardTier};

/// File names expected inside a reference data directory.
pub const LEGACY_FILE: &str = "legacy.json";
pub const CURRENT_FILE: &str = "current.json";
pub const CONVERSION_FILE: &str = "conversion.json";

/// Errors from loading reference data.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// A document could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document is not valid JSON or does not match the expected layout.
    #[error("Invalid {document} document: {source}")]
    Json {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The documents reference units they do not define.
    #[error("Reference data integrity error: {message}")]
    Integrity {
        /// Description of the inconsistency.
        message: String,
    },

    /// A keyword set could not be compiled.
    #[error("Failed to compile keywords for {scope}: {source}")]
    Matcher {
        scope: String,
        #[source]
        source: aho_corasick::BuildError,
    },
}

impl DictionaryError {
    pub(crate) fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }
}

/// All reference data, compiled. Shared read-only behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub legacy: LegacyDictionary,
    pub current: CurrentDictionary,
    pub conversion: ConversionTable,
}

impl ReferenceData {
    /// Compiles parsed documents.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError`] if any document fails validation.
    pub fn from_documents(
        legacy: LegacyDocument,
        current: CurrentDocument,
        conversion: ConversionDocument,
    ) -> Result<Self, DictionaryError> {
        let legacy = LegacyDictionary::compile(legacy)?;
        let current = CurrentDictionary::compile(current)?;
        let conversion = ConversionTable::compile(conversion, &current)?;

        for legacy_province in legacy.provinces().keys() {
            if conversion.new_province(legacy_province).is_none() {
                log::warn!("Legacy province '{legacy_province}' has no 2025 successor");
            }
        }

        Ok(Self {
            legacy,
            current,
            conversion,
        })
    }

    /// Parses and compiles the three documents from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError::Json`] if a document does not parse, or
    /// any validation error from [`Self::from_documents`].
    pub fn from_json_strs(
        legacy: &str,
        current: &str,
        conversion: &str,
    ) -> Result<Self, DictionaryError> {
        Self::from_documents(
            parse_json(LEGACY_FILE, legacy)?,
            parse_json(CURRENT_FILE, current)?,
            parse_json(CONVERSION_FILE, conversion)?,
        )
    }

    /// Loads `legacy.json`, `current.json` and `conversion.json` from a
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError::Io`] if a file cannot be read, or any
    /// parse or validation error.
    pub fn load_dir(dir: &Path) -> Result<Self, DictionaryError> {
        log::info!("Loading reference data from {}", dir.display());
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| DictionaryError::Io { path, source })
        };
        Self::from_json_strs(
            &read(LEGACY_FILE)?,
            &read(CURRENT_FILE)?,
            &read(CONVERSION_FILE)?,
        )
    }

    /// Small embedded dataset covering a handful of provinces. Used by
    /// tests and as a fallback when no data directory is configured.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError`] if the embedded data fails validation.
    #[cfg(feature = "sample-data")]
    pub fn sample() -> Result<Self, DictionaryError> {
        Self::from_json_strs(
            include_str!("../data/sample/legacy.json"),
            include_str!("../data/sample/current.json"),
            include_str!("../data/sample/conversion.json"),
        )
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(
    document: &'static str,
    text: &str,
) -> Result<T, DictionaryError> {
    serde_json::from_str(text).map_err(|source| DictionaryError::Json { document, source })
}
