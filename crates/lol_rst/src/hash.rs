//! Hashing of entry keys
//!
//! Entry keys are the [xxHash64](https://xxhash.com/) of the lowercased UTF-8 name, seed `0`, truncated to the
//! low bits selected by the [`RstType`] of the file. On disk the remaining high bits of each 64-bit word hold the
//! offset of the entry's text inside the data block, so the hash list doubles as the index of the file.
//!
//! ```
//! use lol_rst::hash::{compute_hash, pack_hash, unpack_hash, RstType};
//!
//! # fn main() -> lol_rst::error::Result<()> {
//! let hash = compute_hash("game_client_quit", RstType::Simple);
//! let word = pack_hash(hash, 12, RstType::Simple)?;
//!
//! assert_eq!(unpack_hash(word, RstType::Simple), (hash, 12));
//! # Ok(())
//! # }
//! ```

use derive_more::derive::Display;
use xxhash_rust::xxh64::xxh64;

use crate::error::{Error, Result};

/// Selects how many low bits of a packed word belong to the hash
///
/// Versions 2 and 3 use [`RstType::Complex`], versions 4 and 5 use [`RstType::Simple`].
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RstType {
    /// 40 bit hashes, used by versions 2 and 3
    Complex = 40,

    /// 39 bit hashes, used by versions 4 and 5
    Simple = 39,
}

impl RstType {
    /// Number of low bits holding the hash
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Mask selecting the hash bits of a packed word, `(1 << bits) - 1`
    pub const fn hash_mask(self) -> u64 {
        (1u64 << self.bits()) - 1
    }

    /// Largest data offset that can be stored above the hash bits
    pub const fn max_offset(self) -> u64 {
        u64::MAX >> self.bits()
    }
}

/// Compute the key for `text`.
///
/// The text is lowercased with the locale independent Unicode rules of [`str::to_lowercase`], so `"ABC"` and
/// `"abc"` map to the same key on every platform.
pub fn compute_hash(text: &str, rst_type: RstType) -> u64 {
    xxh64(text.to_lowercase().as_bytes(), 0) & rst_type.hash_mask()
}

/// Compute the key for `text` and combine it with the data `offset` of its value.
///
/// Equivalent to `compute_hash(text, rst_type) + (offset << rst_type.bits())`.
pub fn compute_hash_with_offset(text: &str, offset: u64, rst_type: RstType) -> Result<u64> {
    pack_hash(compute_hash(text, rst_type), offset, rst_type)
}

/// Combine an already computed `hash` with the data `offset` of its value.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if `hash` has bits set outside of [`RstType::hash_mask`]
/// - [`Error::Overflow`] if `offset` is larger than [`RstType::max_offset`]
pub fn pack_hash(hash: u64, offset: u64, rst_type: RstType) -> Result<u64> {
    if hash & !rst_type.hash_mask() != 0 {
        return Err(Error::InvalidArgument(format!(
            "hash {hash:#x} does not fit into {} bits",
            rst_type.bits()
        )));
    }

    if offset > rst_type.max_offset() {
        return Err(Error::Overflow(format!(
            "offset {offset} does not fit above a {} bit hash",
            rst_type.bits()
        )));
    }

    Ok(hash + (offset << rst_type.bits()))
}

/// Split a packed word into its `(hash, offset)` parts
pub const fn unpack_hash(word: u64, rst_type: RstType) -> (u64, u64) {
    (word & rst_type.hash_mask(), word >> rst_type.bits())
}
