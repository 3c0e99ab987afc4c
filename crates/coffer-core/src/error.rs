//! Error types for the coffer-core library.
//!
//! Every fallible operation in the crate returns [`Result`], built on the
//! `thiserror`-derived [`Error`] below.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for coffer-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for loading sheets and writing reports
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The data root handed to the loader does not exist or is not a directory
    #[error("game data root '{path}' does not exist or is not a directory")]
    DataRootNotFound {
        /// The path that was checked
        path: PathBuf,
    },

    /// No exported file for a sheet was found under the data root
    #[error("sheet '{sheet}' not found under '{root}'")]
    SheetNotFound {
        /// Name of the requested sheet
        sheet: &'static str,
        /// Directory that was searched
        root: PathBuf,
    },

    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A sheet file did not contain valid rows
    #[error("failed to parse sheet file '{path}': {source}")]
    SheetParse {
        /// Path to the sheet file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A sheet file does not match the digest stored next to it
    #[error("checksum mismatch for '{path}': expected {expected}, found {actual}")]
    ChecksumMismatch {
        /// Path to the sheet file
        path: PathBuf,
        /// Digest recorded in the sidecar file
        expected: String,
        /// Digest of the file on disk
        actual: String,
    },

    /// A row referenced by id is not present in its sheet
    #[error("row {row_id} not found in sheet '{sheet}'")]
    MissingRow {
        /// Name of the sheet
        sheet: &'static str,
        /// The missing row id
        row_id: u32,
    },

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new data root error
    pub fn data_root_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DataRootNotFound { path: path.into() }
    }

    /// Creates a new missing sheet error
    pub fn sheet_not_found(sheet: &'static str, root: impl Into<PathBuf>) -> Self {
        Self::SheetNotFound {
            sheet,
            root: root.into(),
        }
    }

    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new sheet parse error
    pub fn sheet_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::SheetParse {
            path: path.into(),
            source,
        }
    }

    /// Creates a new checksum mismatch error
    pub fn checksum_mismatch(
        path: impl Into<PathBuf>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ChecksumMismatch {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new missing row error
    pub fn missing_row(sheet: &'static str, row_id: u32) -> Self {
        Self::MissingRow { sheet, row_id }
    }

    /// Creates a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this error stops the game data from loading at all
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DataRootNotFound { .. }
                | Self::SheetNotFound { .. }
                | Self::SheetParse { .. }
                | Self::ChecksumMismatch { .. }
        )
    }
}
