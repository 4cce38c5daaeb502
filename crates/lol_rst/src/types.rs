//! Base types for structure of RST file.

use derive_more::derive::{Deref, Display, IntoIterator};
use indexmap::IndexMap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::hash::{compute_hash, RstType};

/// Magic bytes every RST file starts with
pub const MAGIC: [u8; 3] = *b"RST";

/// RST file version
///
/// The version decides the layout of the header, see [`RstVersion::layout`].
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum RstVersion {
    /// Version 2, complex hashes with an optional font config
    #[display("2")]
    V2 = 2,

    /// Version 3, complex hashes
    #[display("3")]
    V3 = 3,

    /// Version 4, simple hashes
    #[display("4")]
    V4 = 4,

    /// Version 5, simple hashes without a mode byte
    #[display("5")]
    V5 = 5,
}

/// Header features of a single [`RstVersion`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RstLayout {
    /// Width of the hashes stored in the file
    pub rst_type: RstType,

    /// Whether a mode byte follows the hash list
    pub has_mode: bool,

    /// Whether the header may carry a font config
    pub supports_config: bool,
}

impl RstVersion {
    /// All supported versions, oldest first
    pub const ALL: [RstVersion; 4] = [
        RstVersion::V2,
        RstVersion::V3,
        RstVersion::V4,
        RstVersion::V5,
    ];

    /// The newest supported version
    pub const fn latest() -> RstVersion {
        RstVersion::V5
    }

    /// Header features of this version
    pub const fn layout(self) -> RstLayout {
        match self {
            RstVersion::V2 => RstLayout {
                rst_type: RstType::Complex,
                has_mode: true,
                supports_config: true,
            },
            RstVersion::V3 => RstLayout {
                rst_type: RstType::Complex,
                has_mode: true,
                supports_config: false,
            },
            RstVersion::V4 => RstLayout {
                rst_type: RstType::Simple,
                has_mode: true,
                supports_config: false,
            },
            RstVersion::V5 => RstLayout {
                rst_type: RstType::Simple,
                has_mode: false,
                supports_config: false,
            },
        }
    }

    /// The hash width used by this version
    pub const fn rst_type(self) -> RstType {
        self.layout().rst_type
    }
}

impl TryFrom<u8> for RstVersion {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            2 => Ok(RstVersion::V2),
            3 => Ok(RstVersion::V3),
            4 => Ok(RstVersion::V4),
            5 => Ok(RstVersion::V5),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }
}

impl From<RstVersion> for u8 {
    fn from(value: RstVersion) -> Self {
        value as u8
    }
}

/// A decoded RST string table
///
/// Entries map a hash key (see [`crate::hash::compute_hash`]) to its text. The table dereferences to the
/// underlying [`IndexMap`] for lookups and iteration; all mutation goes through methods that keep the keys
/// inside the hash width of the file's version.
///
/// ```
/// use lol_rst::{RstFile, RstVersion};
///
/// # fn main() -> lol_rst::error::Result<()> {
/// let mut rst = RstFile::new(RstVersion::V5);
/// rst.insert_named("game_client_quit", "Quit")?;
///
/// let bytes = rst.to_bytes()?;
/// assert_eq!(RstFile::from_bytes(&bytes)?, rst);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Deref, IntoIterator)]
pub struct RstFile {
    version: RstVersion,
    config: Option<String>,
    mode: u8,
    #[deref]
    #[into_iterator(owned, ref)]
    entries: IndexMap<u64, String>,
}

impl RstFile {
    /// Create an empty table of the given version.
    pub fn new(version: RstVersion) -> RstFile {
        RstFile {
            version,
            config: None,
            mode: 0,
            entries: IndexMap::new(),
        }
    }

    /// Assemble a table from already validated parts
    pub(crate) fn from_parts(
        version: RstVersion,
        config: Option<String>,
        mode: u8,
        entries: IndexMap<u64, String>,
    ) -> RstFile {
        RstFile {
            version,
            config,
            mode,
            entries,
        }
    }

    /// The version this table is encoded with
    pub fn version(&self) -> RstVersion {
        self.version
    }

    /// The hash width, derived from [`RstFile::version`]
    pub fn rst_type(&self) -> RstType {
        self.version.rst_type()
    }

    /// The font config, only ever present on version 2 tables
    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Set the font config.
    ///
    /// Returns `false` and leaves the table untouched unless this is a version 2 table. An empty config is not
    /// written to disk, so setting one clears the config.
    pub fn set_config(&mut self, config: impl Into<String>) -> bool {
        if !self.version.layout().supports_config {
            return false;
        }
        let config = config.into();
        self.config = (!config.is_empty()).then_some(config);
        true
    }

    /// Remove the font config, returning the previous one
    pub fn clear_config(&mut self) -> Option<String> {
        self.config.take()
    }

    /// The mode byte, always `0` for versions without one
    pub fn mode(&self) -> u8 {
        self.mode
    }

    /// Set the mode byte.
    ///
    /// Returns `false` and leaves the table untouched if the version has no mode byte.
    pub fn set_mode(&mut self, mode: u8) -> bool {
        if !self.version.layout().has_mode {
            return false;
        }
        self.mode = mode;
        true
    }

    /// Get the entries in this table
    pub fn entries(&self) -> &IndexMap<u64, String> {
        &self.entries
    }

    /// Insert `text` under `hash`, returning the text it replaced.
    ///
    /// Replacing keeps the entry's position.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `hash` does not fit into the hash width of this table.
    pub fn insert(&mut self, hash: u64, text: impl Into<String>) -> Result<Option<String>> {
        let rst_type = self.rst_type();
        if hash & !rst_type.hash_mask() != 0 {
            return Err(Error::InvalidArgument(format!(
                "hash {hash:#x} does not fit into {} bits",
                rst_type.bits()
            )));
        }

        trace!(hash, "inserting entry");
        Ok(self.entries.insert(hash, text.into()))
    }

    /// Insert `text` under the hash of `name`, returning the hash used
    pub fn insert_named(&mut self, name: &str, text: impl Into<String>) -> Result<u64> {
        let hash = compute_hash(name, self.rst_type());
        self.insert(hash, text)?;
        Ok(hash)
    }

    /// Try to get the text stored under `hash`
    pub fn by_hash(&self, hash: u64) -> Option<&str> {
        self.entries.get(&hash).map(String::as_str)
    }

    /// Try to get the text stored under the hash of `name`
    pub fn by_name(&self, name: &str) -> Option<&str> {
        self.by_hash(compute_hash(name, self.rst_type()))
    }

    /// Get mutable access to the text stored under `hash`
    pub fn get_mut(&mut self, hash: u64) -> Option<&mut String> {
        self.entries.get_mut(&hash)
    }

    /// Remove the entry stored under `hash`, keeping the order of the others
    pub fn remove(&mut self, hash: u64) -> Option<String> {
        self.entries.shift_remove(&hash)
    }

    /// Mutable iterator over the texts in insertion order
    pub fn values_mut(&mut self) -> indexmap::map::ValuesMut<'_, u64, String> {
        self.entries.values_mut()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of distinct texts, which is the number of strings stored in the data block
    pub fn unique_texts(&self) -> usize {
        self.entries
            .values()
            .collect::<std::collections::HashSet<_>>()
            .len()
    }
}

impl PartialEq for RstFile {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && (self.version != RstVersion::V2 || self.config == other.config)
            && self.rst_type() == other.rst_type()
            && self.mode == other.mode
            && self.entries == other.entries
    }
}

impl Eq for RstFile {}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::hash::{compute_hash, RstType};
    use crate::types::{RstFile, RstVersion};

    #[test]
    fn version_layouts() {
        let types = RstVersion::ALL.map(|v| v.rst_type());
        assert_eq!(
            types,
            [
                RstType::Complex,
                RstType::Complex,
                RstType::Simple,
                RstType::Simple
            ]
        );

        let modes = RstVersion::ALL.map(|v| v.layout().has_mode);
        assert_eq!(modes, [true, true, true, false]);

        let configs = RstVersion::ALL.map(|v| v.layout().supports_config);
        assert_eq!(configs, [true, false, false, false]);
    }

    #[test]
    fn version_from_byte() {
        for version in RstVersion::ALL {
            assert_eq!(RstVersion::try_from(u8::from(version)).ok(), Some(version));
        }

        assert!(matches!(
            RstVersion::try_from(6),
            Err(Error::UnsupportedVersion(6))
        ));
        assert!(matches!(
            RstVersion::try_from(1),
            Err(Error::UnsupportedVersion(1))
        ));
    }

    #[test]
    fn config_only_on_version_2() {
        let mut rst = RstFile::new(RstVersion::V2);
        assert!(rst.set_config("fonts"));
        assert_eq!(rst.config(), Some("fonts"));
        assert!(rst.set_config(""));
        assert_eq!(rst.config(), None);

        for version in [RstVersion::V3, RstVersion::V4, RstVersion::V5] {
            let mut rst = RstFile::new(version);
            assert!(!rst.set_config("fonts"));
            assert_eq!(rst.config(), None);
        }
    }

    #[test]
    fn mode_not_on_version_5() {
        let mut rst = RstFile::new(RstVersion::V4);
        assert!(rst.set_mode(1));
        assert_eq!(rst.mode(), 1);

        let mut rst = RstFile::new(RstVersion::V5);
        assert!(!rst.set_mode(1));
        assert_eq!(rst.mode(), 0);
    }

    #[test]
    fn insert_rejects_wide_hashes() -> Result<()> {
        let mut rst = RstFile::new(RstVersion::V5);
        let result = rst.insert(1 << 39, "too wide");
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(rst.is_empty());

        let mut rst = RstFile::new(RstVersion::V3);
        rst.insert(1 << 39, "fits")?;
        assert_eq!(rst.by_hash(1 << 39), Some("fits"));

        Ok(())
    }

    #[test]
    fn later_inserts_overwrite() -> Result<()> {
        let mut rst = RstFile::new(RstVersion::V5);
        assert_eq!(rst.insert(1, "first")?, None);
        rst.insert(2, "second")?;
        assert_eq!(rst.insert(1, "third")?, Some("first".to_string()));

        assert_eq!(rst.len(), 2);
        assert_eq!(rst.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(rst.by_hash(1), Some("third"));

        Ok(())
    }

    #[test]
    fn named_lookup() -> Result<()> {
        let mut rst = RstFile::new(RstVersion::V4);
        let hash = rst.insert_named("Game_Client_Quit", "Quit")?;

        assert_eq!(hash, compute_hash("game_client_quit", RstType::Simple));
        assert_eq!(rst.by_name("GAME_CLIENT_QUIT"), Some("Quit"));

        Ok(())
    }

    #[test]
    fn equality_ignores_order() -> Result<()> {
        let mut left = RstFile::new(RstVersion::V3);
        left.insert(1, "a")?;
        left.insert(2, "b")?;

        let mut right = RstFile::new(RstVersion::V3);
        right.insert(2, "b")?;
        right.insert(1, "a")?;

        assert_eq!(left, right);

        right.set_mode(3);
        assert_ne!(left, right);

        Ok(())
    }

    #[test]
    fn equality_checks_version_and_config() -> Result<()> {
        let mut v2 = RstFile::new(RstVersion::V2);
        v2.insert(1, "a")?;
        let mut v3 = RstFile::new(RstVersion::V3);
        v3.insert(1, "a")?;
        assert_ne!(v2, v3);

        let mut configured = v2.clone();
        configured.set_config("fonts");
        assert_ne!(v2, configured);

        Ok(())
    }

    #[test]
    fn counts_unique_texts() -> Result<()> {
        let mut rst = RstFile::new(RstVersion::V5);
        rst.insert(1001, "Hello")?;
        rst.insert(1002, "Hello")?;
        rst.insert(1003, "World")?;

        assert_eq!(rst.len(), 3);
        assert_eq!(rst.unique_texts(), 2);

        Ok(())
    }
}
