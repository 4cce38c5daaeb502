//! This library handles reading from and creating **RST** files used by *League of Legends*.
//!
//! # RST Format Documentation
//!
//! RST ("Riot String Table") files store the localized text of the game client, keyed by 64-bit hashes of the
//! text names. They are found under `DATA/Menu`, for example `fontconfig_en_us.txt` or
//! `bootstrap_zh_cn.stringtable`.
//!
//! ## File Structure
//!
//! A RST file consists of a header, a list of packed hash words, an optional mode byte and the data block.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 3 bytes: "RST"                                             |
//! | 0x0003         | Version                | 1 byte: 2, 3, 4 or 5                                       |
//! | 0x0004         | Has Config             | 1 byte: version 2 only, 0 or 1                             |
//! | 0x0005         | Config Length          | 4 bytes: only if Has Config is 1                           |
//! | 0x0009         | Config                 | (Config Length) bytes: UTF-8 font config                   |
//! | ...            | Entry Count            | 4 bytes: The number of entries in this file                |
//! | ...            | Hash List              | (Entry Count * 8) bytes: packed hash words                 |
//! | ...            | Mode                   | 1 byte: versions 2, 3 and 4 only                           |
//! | ...            | Data                   | NUL terminated UTF-8 texts                                 |
//!
//! ### Header
//!
//! - **Magic Number**: The ASCII bytes `RST`.
//! - **Version**: A single byte. Versions 2 and 3 use 40 bit hashes ([`RstType::Complex`]), versions 4 and 5
//!   use 39 bit hashes ([`RstType::Simple`]).
//! - **Config**: Only version 2 may carry a font config, preceded by a flag byte and its length.
//! - **Entry Count**: A 4-byte unsigned integer indicating the number of hash words.
//!
//! ### Hash List
//!
//! Every entry is a single 64-bit word. The low bits hold the hash of the entry's name (see [`hash`]), the
//! remaining high bits hold the offset of its text from the start of the data block.
//!
//! | Version | Hash bits | Offset bits |
//! |---------|-----------|-------------|
//! | 2, 3    | 0..40     | 40..64      |
//! | 4, 5    | 0..39     | 39..64      |
//!
//! ### Mode
//!
//! A single byte following the hash list. It was dropped in version 5.
//!
//! ### Data
//!
//! The texts, each terminated by a `0x00` byte. Identical texts are stored once and every entry holding that
//! text points at the same offset.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod builder;
pub mod error;
pub mod hash;
pub mod read;
pub mod types;
pub mod write;

#[cfg(feature = "polars")]
mod frame;
#[cfg(feature = "serde")]
mod serde;

pub use builder::RstBuilder;
pub use hash::{compute_hash, RstType};
pub use read::{RstReaderOptions, TextPolicy};
pub use types::{RstFile, RstVersion};
pub use write::RstWriter;
