//! Types for reading RST files
//!

use bon::Builder;
use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use std::{
    collections::{hash_map::Entry, HashMap},
    fs::File,
    io::{self, Cursor, Read},
    path::Path,
    str,
};
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    hash::unpack_hash,
    types::{RstFile, RstVersion, MAGIC},
};

/// How invalid UTF-8 in the config or the entry texts is handled
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TextPolicy {
    /// Fail with [`Error::InvalidEncoding`]
    #[default]
    Strict,

    /// Substitute `U+FFFD` for every invalid sequence
    Lossy,
}

/// Options for how the RST file should be read
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct RstReaderOptions {
    /// How to handle text that is not valid UTF-8
    #[builder(default)]
    pub text_policy: TextPolicy,
}

impl RstFile {
    /// Load a RST file from a path.
    #[instrument(skip_all, err, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<RstFile> {
        let file = File::open(path.as_ref())?;
        Self::read(file)
    }

    /// Read a RST file with the default [`RstReaderOptions`].
    ///
    /// ```no_run
    /// use std::io::prelude::*;
    ///
    /// fn list_entries(reader: impl Read) -> lol_rst::error::Result<()> {
    ///     let rst = lol_rst::RstFile::read(reader)?;
    ///
    ///     for (hash, text) in rst.iter() {
    ///         println!("{hash:#012x}: {text}");
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn read<R: Read>(reader: R) -> Result<RstFile> {
        Self::read_with(reader, RstReaderOptions::default())
    }

    /// Read a RST file.
    ///
    /// The whole input is buffered first since every text is addressed relative to the data block.
    pub fn read_with<R: Read>(mut reader: R, options: RstReaderOptions) -> Result<RstFile> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with(&data, options)
    }

    /// Parse a RST file from memory with the default [`RstReaderOptions`].
    pub fn from_bytes(data: &[u8]) -> Result<RstFile> {
        Self::from_bytes_with(data, RstReaderOptions::default())
    }

    /// Parse a RST file from memory.
    ///
    /// Texts are materialized eagerly: each distinct offset is decoded once, and every entry pointing at it
    /// receives its own copy of the text.
    #[instrument(skip(data), err, fields(size = data.len()))]
    pub fn from_bytes_with(data: &[u8], options: RstReaderOptions) -> Result<RstFile> {
        let mut cursor = Cursor::new(data);

        let mut magic = [0u8; 3];
        cursor.read_exact(&mut magic).map_err(eof)?;
        if magic != MAGIC {
            return Err(Error::InvalidFormat { magic });
        }

        let version = RstVersion::try_from(cursor.read_u8().map_err(eof)?)?;
        let layout = version.layout();

        let mut config = None;
        if layout.supports_config && cursor.read_u8().map_err(eof)? != 0 {
            let length = cursor.read_u32::<LittleEndian>().map_err(eof)?;
            let start = cursor.position();
            let bytes = take(&mut cursor, length as usize)?;
            config = Some(decode_text(bytes, start, options.text_policy)?)
                .filter(|config| !config.is_empty());
        }

        let count = cursor.read_u32::<LittleEndian>().map_err(eof)?;
        let remaining = data.len() as u64 - cursor.position();
        if u64::from(count) * 8 > remaining {
            return Err(Error::UnexpectedEndOfData);
        }

        let rst_type = layout.rst_type;
        let mut words = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let word = cursor.read_u64::<LittleEndian>().map_err(eof)?;
            words.push(unpack_hash(word, rst_type));
        }

        let mode = if layout.has_mode {
            cursor.read_u8().map_err(eof)?
        } else {
            0
        };

        let data_base = cursor.position() as usize;
        let block = &data[data_base..];
        debug!(%version, count, mode, data_size = block.len(), "read header");

        let mut texts: HashMap<u64, String> = HashMap::with_capacity(words.len());
        let mut entries = IndexMap::with_capacity(words.len());
        for (hash, offset) in words {
            let text = match texts.entry(offset) {
                Entry::Occupied(entry) => entry.get().clone(),
                Entry::Vacant(entry) => entry
                    .insert(read_text(block, data_base, offset, options.text_policy)?)
                    .clone(),
            };
            entries.insert(hash, text);
        }
        debug!(entries = entries.len(), texts = texts.len(), "read entries");

        Ok(RstFile::from_parts(version, config, mode, entries))
    }
}

fn eof(error: io::Error) -> Error {
    match error.kind() {
        io::ErrorKind::UnexpectedEof => Error::UnexpectedEndOfData,
        _ => Error::IOError(error),
    }
}

fn take<'a>(cursor: &mut Cursor<&'a [u8]>, length: usize) -> Result<&'a [u8]> {
    let data: &'a [u8] = *cursor.get_ref();
    let start = cursor.position() as usize;
    let end = start
        .checked_add(length)
        .filter(|end| *end <= data.len())
        .ok_or(Error::UnexpectedEndOfData)?;

    cursor.set_position(end as u64);
    Ok(&data[start..end])
}

fn read_text(block: &[u8], data_base: usize, offset: u64, policy: TextPolicy) -> Result<String> {
    let start = usize::try_from(offset)
        .ok()
        .filter(|start| *start < block.len())
        .ok_or(Error::UnexpectedEndOfData)?;

    let length = block[start..]
        .iter()
        .position(|b| *b == b'\0')
        .ok_or(Error::UnexpectedEndOfData)?;

    decode_text(
        &block[start..start + length],
        (data_base + start) as u64,
        policy,
    )
}

fn decode_text(bytes: &[u8], offset: u64, policy: TextPolicy) -> Result<String> {
    match policy {
        TextPolicy::Strict => str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|source| Error::InvalidEncoding { offset, source }),
        TextPolicy::Lossy => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}
