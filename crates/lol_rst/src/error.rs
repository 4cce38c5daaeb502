//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// The file does not start with the `RST` magic
    #[error("invalid string table magic {magic:02X?}")]
    #[diagnostic(help("string table files start with the bytes `RST`"))]
    InvalidFormat {
        /// The bytes found where the magic was expected
        magic: [u8; 3],
    },

    /// The version byte is not one of 2, 3, 4 or 5
    #[error("unsupported string table version {0}")]
    #[diagnostic(help("supported versions are 2, 3, 4 and 5"))]
    UnsupportedVersion(u8),

    /// The input ended before a complete structure could be read
    #[error("unexpected end of string table data")]
    UnexpectedEndOfData,

    /// A config or entry string is not valid UTF-8
    #[error("invalid utf-8 in string at offset {offset}")]
    InvalidEncoding {
        /// Absolute position of the string in the input
        offset: u64,
        /// Underlying decoding failure
        #[source]
        source: std::str::Utf8Error,
    },

    /// {0}
    #[error("{0}")]
    InvalidArgument(String),

    /// {0}
    #[error("{0}")]
    Overflow(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
