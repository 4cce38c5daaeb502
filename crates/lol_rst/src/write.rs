//! Types for writing RST files
//!

use byteorder::{LittleEndian, WriteBytesExt};
use indexmap::IndexMap;
use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::{debug, instrument, trace};

use crate::{
    error::{Error, Result},
    hash::pack_hash,
    types::{RstFile, RstVersion, MAGIC},
};

/// RST file generator
///
/// Entries are collected in memory and the file is emitted in one go by [`RstWriter::finish`], because the hash
/// list in front of the data block needs the final offset of every text. Identical texts are stored once and
/// share their offset.
///
/// ```
/// # fn doit() -> lol_rst::error::Result<()>
/// # {
/// use lol_rst::{RstVersion, RstWriter};
///
/// // We use a buffer here, though you'd normally use a `File`
/// let mut rst = RstWriter::new(Vec::new(), RstVersion::V5);
///
/// rst.write_entry(1001, "Hello")?;
/// rst.write_entry(1002, "Hello")?;
/// rst.write_entry(1003, "World")?;
///
/// let bytes = rst.finish()?;
/// assert_eq!(bytes.len(), 8 + 3 * 8 + 12);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct RstWriter<W: Write> {
    inner: W,
    version: RstVersion,
    config: Option<String>,
    mode: u8,
    offsets: IndexMap<u64, u64>,
    data_block: Vec<u8>,
    text_offsets: HashMap<String, u64>,
}

impl<W: Write> RstWriter<W> {
    /// Initializes the file.
    pub fn new(inner: W, version: RstVersion) -> RstWriter<W> {
        RstWriter {
            inner,
            version,
            config: None,
            mode: 0,
            offsets: IndexMap::new(),
            data_block: Vec::new(),
            text_offsets: HashMap::new(),
        }
    }

    /// Set the font config written to the header.
    ///
    /// Returns `false` if the version has no config. An empty config is not written.
    pub fn set_config(&mut self, config: &str) -> bool {
        if !self.version.layout().supports_config {
            return false;
        }
        self.config = (!config.is_empty()).then(|| config.to_owned());
        true
    }

    /// Set the mode byte.
    ///
    /// Returns `false` if the version has no mode byte.
    pub fn set_mode(&mut self, mode: u8) -> bool {
        if !self.version.layout().has_mode {
            return false;
        }
        self.mode = mode;
        true
    }

    /// Number of entries written so far
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether no entry has been written yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the data block so far
    pub fn data_size(&self) -> usize {
        self.data_block.len()
    }

    /// Add an entry, returning the offset of its text in the data block.
    ///
    /// Writing a hash twice points it at the latest text. The earlier text stays in the data block.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `hash` does not fit into the hash width of the version, or if `text`
    ///   contains a NUL byte, which would end the text early when read back
    /// - [`Error::Overflow`] if the data block has grown past the largest offset a packed word can hold
    #[instrument(skip(self, text), err, level = "trace")]
    pub fn write_entry(&mut self, hash: u64, text: &str) -> Result<u64> {
        let rst_type = self.version.rst_type();
        if hash & !rst_type.hash_mask() != 0 {
            return Err(Error::InvalidArgument(format!(
                "hash {hash:#x} does not fit into {} bits",
                rst_type.bits()
            )));
        }

        if text.contains('\0') {
            return Err(Error::InvalidArgument(format!(
                "text for hash {hash:#x} contains a NUL byte"
            )));
        }

        let offset = self.intern(text)?;
        self.offsets.insert(hash, offset);

        Ok(offset)
    }

    fn intern(&mut self, text: &str) -> Result<u64> {
        if let Some(offset) = self.text_offsets.get(text) {
            trace!(offset, "reusing text");
            return Ok(*offset);
        }

        let offset = self.data_block.len() as u64;
        let max_offset = self.version.rst_type().max_offset();
        if offset > max_offset {
            return Err(Error::Overflow(format!(
                "data block offset {offset} is larger than {max_offset}"
            )));
        }

        self.data_block.write_all(text.as_bytes())?;
        self.data_block.write_u8(0u8)?;
        self.text_offsets.insert(text.to_owned(), offset);

        Ok(offset)
    }

    /// Write the header, hash list and data block
    ///
    /// This will return the writer, but one should normally not append any data to the end of the file.
    #[instrument(skip(self), err, fields(version = %self.version, entries = self.offsets.len()))]
    pub fn finish(mut self) -> Result<W> {
        let layout = self.version.layout();
        let count = u32::try_from(self.offsets.len())
            .map_err(|_| Error::Overflow(format!("{} entries do not fit", self.offsets.len())))?;

        let mut header = Vec::with_capacity(9 + self.offsets.len() * 8);
        header.write_all(&MAGIC)?;
        header.write_u8(self.version.into())?;

        if layout.supports_config {
            match &self.config {
                Some(config) => {
                    let length = u32::try_from(config.len())
                        .map_err(|_| Error::Overflow("config is too long".into()))?;
                    header.write_u8(1)?;
                    header.write_u32::<LittleEndian>(length)?;
                    header.write_all(config.as_bytes())?;
                }
                None => header.write_u8(0)?,
            }
        }

        header.write_u32::<LittleEndian>(count)?;
        for (hash, offset) in &self.offsets {
            header.write_u64::<LittleEndian>(pack_hash(*hash, *offset, layout.rst_type)?)?;
        }

        if layout.has_mode {
            header.write_u8(self.mode)?;
        }

        debug!(
            header_size = header.len(),
            data_size = self.data_block.len(),
            texts = self.text_offsets.len(),
            "writing file"
        );

        self.inner.write_all(&header)?;
        self.inner.write_all(&self.data_block)?;
        self.inner.flush()?;

        Ok(self.inner)
    }
}

impl RstFile {
    /// Write this table, returning the writer.
    pub fn write<W: Write>(&self, writer: W) -> Result<W> {
        let mut rst = RstWriter::new(writer, self.version());
        if let Some(config) = self.config() {
            rst.set_config(config);
        }
        rst.set_mode(self.mode());

        for (hash, text) in self.iter() {
            rst.write_entry(*hash, text)?;
        }

        rst.finish()
    }

    /// Encode this table into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.write(Vec::new())
    }

    /// Save this table to a path, replacing any existing file.
    #[instrument(skip_all, err, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write(BufWriter::new(file))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_str_eq};
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::types::{RstFile, RstVersion};
    use crate::write::RstWriter;

    #[traced_test]
    #[test]
    fn rst_empty_v5_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x52, 0x53, 0x54, 0x05,
            0x00, 0x00, 0x00, 0x00,
        ];

        let result = RstFile::new(RstVersion::V5).to_bytes()?;
        assert_eq!(result, expected);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn rst_empty_v2_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x52, 0x53, 0x54, 0x02,
            // No config
            0x00,
            0x00, 0x00, 0x00, 0x00,
            // Mode
            0x00,
        ];

        let result = RstFile::new(RstVersion::V2).to_bytes()?;
        assert_eq!(result, expected);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn rst_deduplicated_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            // Header
            0x52, 0x53, 0x54, 0x05,
            0x03, 0x00, 0x00, 0x00,
            // Hashes
            0xE9, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0xEA, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0xEB, 0x03, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00,
            // Data
            0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x00,
            0x57, 0x6F, 0x72, 0x6C, 0x64, 0x00,
        ];

        let mut rst = RstFile::new(RstVersion::V5);
        rst.insert(1001, "Hello")?;
        rst.insert(1002, "Hello")?;
        rst.insert(1003, "World")?;

        let result = rst.to_bytes()?;
        assert_eq!(result.len(), expected.len());
        assert_str_eq!(format!("{:02X?}", result), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn rst_v2_config_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            // Header
            0x52, 0x53, 0x54, 0x02,
            0x01,
            0x05, 0x00, 0x00, 0x00,
            0x66, 0x6F, 0x6E, 0x74, 0x73,
            0x01, 0x00, 0x00, 0x00,
            // Hashes
            0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Mode
            0x07,
            // Data
            0x48, 0x69, 0x00,
        ];

        let mut rst = RstFile::new(RstVersion::V2);
        rst.set_config("fonts");
        rst.set_mode(7);
        rst.insert(0x10, "Hi")?;

        let result = rst.to_bytes()?;
        assert_str_eq!(format!("{:02X?}", result), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn rst_complex_offset_write() -> Result<()> {
        #[rustfmt::skip]
        let expected = [
            // Header
            0x52, 0x53, 0x54, 0x03,
            0x02, 0x00, 0x00, 0x00,
            // Hashes
            0xAB, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0xCD, 0x00, 0x00, 0x00, 0xFF, 0x06, 0x00, 0x00,
            // Mode
            0x00,
            // Data
            0x66, 0x69, 0x72, 0x73, 0x74, 0x00,
            0x6E, 0x65, 0x78, 0x74, 0x00,
        ];

        let mut rst = RstFile::new(RstVersion::V3);
        rst.insert(0xAB, "first")?;
        rst.insert(0xFF_0000_00CD, "next")?;

        let result = rst.to_bytes()?;
        assert_str_eq!(format!("{:02X?}", result), format!("{:02X?}", expected));

        Ok(())
    }

    #[test]
    fn writer_reports_offsets() -> Result<()> {
        let mut rst = RstWriter::new(Vec::new(), RstVersion::V4);
        assert_eq!(rst.write_entry(1, "Hello")?, 0);
        assert_eq!(rst.write_entry(2, "World")?, 6);
        assert_eq!(rst.write_entry(3, "Hello")?, 0);
        assert_eq!(rst.write_entry(4, "")?, 12);
        assert_eq!(rst.len(), 4);
        assert_eq!(rst.data_size(), 13);

        Ok(())
    }

    #[test]
    fn writer_gates_header_fields() {
        let mut rst = RstWriter::new(Vec::new(), RstVersion::V5);
        assert!(!rst.set_config("fonts"));
        assert!(!rst.set_mode(1));

        let mut rst = RstWriter::new(Vec::new(), RstVersion::V2);
        assert!(rst.set_config("fonts"));
        assert!(rst.set_mode(1));
    }

    #[test]
    fn writer_rejects_wide_hash() {
        let mut rst = RstWriter::new(Vec::new(), RstVersion::V5);
        let result = rst.write_entry(1 << 39, "text");
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(rst.is_empty());
        assert_eq!(rst.data_size(), 0);
    }

    #[test]
    fn writer_rejects_embedded_nul() -> Result<()> {
        let mut rst = RstWriter::new(Vec::new(), RstVersion::V5);
        let result = rst.write_entry(1, "a\0b");
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(rst.is_empty());
        assert_eq!(rst.data_size(), 0);

        assert_eq!(rst.write_entry(2, "a")?, 0);
        assert_eq!(rst.data_size(), 2);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn rst_embedded_nul_is_not_encoded() -> Result<()> {
        let mut rst = RstFile::new(RstVersion::V4);
        rst.insert(1, "ok")?;
        rst.insert(2, "a\0b")?;

        assert!(matches!(rst.to_bytes(), Err(Error::InvalidArgument(_))));

        Ok(())
    }

    #[test]
    fn writer_rejects_offset_overflow() -> Result<()> {
        let mut rst = RstWriter::new(Vec::new(), RstVersion::V3);
        let filler = "a".repeat(0xFF_FFFF);

        assert_eq!(rst.write_entry(1, &filler)?, 0);
        let result = rst.write_entry(2, "b");
        assert!(matches!(result, Err(Error::Overflow(_))));

        Ok(())
    }
}
