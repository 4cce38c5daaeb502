//! Fluent wrapper for assembling RST files
//!

use std::{io::Write, path::Path};

use crate::{
    error::{Error, Result},
    types::{RstFile, RstVersion},
};

/// Builds a [`RstFile`] one entry at a time.
///
/// ```
/// # fn doit() -> lol_rst::error::Result<()>
/// # {
/// use lol_rst::{RstBuilder, RstVersion};
///
/// let mut builder = RstBuilder::with_version(RstVersion::V2);
/// builder
///     .add(1, "Play")?
///     .add(2, 42)?
///     .add_named("game_client_quit", "Quit")?;
/// assert!(builder.set_config("fonts"));
///
/// let bytes = builder.build(Vec::new())?;
/// assert_eq!(lol_rst::RstFile::from_bytes(&bytes)?, *builder.current());
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RstBuilder {
    current: RstFile,
}

impl Default for RstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<RstFile> for RstBuilder {
    fn from(current: RstFile) -> Self {
        RstBuilder { current }
    }
}

impl RstBuilder {
    /// Start an empty file of the latest version
    pub fn new() -> RstBuilder {
        Self::with_version(RstVersion::latest())
    }

    /// Start an empty file of the given version
    pub fn with_version(version: RstVersion) -> RstBuilder {
        RstBuilder {
            current: RstFile::new(version),
        }
    }

    /// The file being built
    pub fn current(&self) -> &RstFile {
        &self.current
    }

    /// Return the file being built
    pub fn into_inner(self) -> RstFile {
        self.current
    }

    /// Add or replace the entry under `hash`
    pub fn add(&mut self, hash: u64, value: impl ToString) -> Result<&mut Self> {
        self.current.insert(hash, value.to_string())?;
        Ok(self)
    }

    /// Add or replace the entry under the hash of `name`
    pub fn add_named(&mut self, name: &str, value: impl ToString) -> Result<&mut Self> {
        self.current.insert_named(name, value.to_string())?;
        Ok(self)
    }

    /// Add the entry only if `hash` is not present yet, returning whether it was added
    pub fn try_add(&mut self, hash: u64, value: impl ToString) -> Result<bool> {
        if self.contains_key(hash) {
            return Ok(false);
        }
        self.current.insert(hash, value.to_string())?;
        Ok(true)
    }

    /// Get the text stored under `hash`
    pub fn get(&self, hash: u64) -> Option<&str> {
        self.current.by_hash(hash)
    }

    /// Whether an entry is stored under `hash`
    pub fn contains_key(&self, hash: u64) -> bool {
        self.current.contains_key(&hash)
    }

    /// Whether any entry holds exactly `value`
    pub fn contains_value(&self, value: &str) -> bool {
        self.current.values().any(|v| v == value)
    }

    /// Remove the entry under `hash`, returning whether it existed
    pub fn remove(&mut self, hash: u64) -> bool {
        self.current.remove(hash).is_some()
    }

    /// Remove every entry
    pub fn clear(&mut self) -> &mut Self {
        self.current.clear();
        self
    }

    /// Replace every occurrence of `old` with `new` in all texts.
    ///
    /// Without `case_sensitive` occurrences are matched after lowercasing both sides, and only the matched part
    /// of the text is replaced.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `old` is empty.
    pub fn replace_all(&mut self, old: &str, new: &str, case_sensitive: bool) -> Result<&mut Self> {
        if old.is_empty() {
            return Err(Error::InvalidArgument(
                "the text to replace must not be empty".into(),
            ));
        }

        let needle = old.to_lowercase();
        for text in self.current.values_mut() {
            let replaced = if case_sensitive {
                text.contains(old).then(|| text.replace(old, new))
            } else {
                replace_ignore_case(text, &needle, new)
            };

            if let Some(replaced) = replaced {
                *text = replaced;
            }
        }
        Ok(self)
    }

    /// Set the font config, returning `false` unless the file is version 2
    pub fn set_config(&mut self, config: &str) -> bool {
        self.current.set_config(config)
    }

    /// Set the mode byte, returning `false` if the version has none
    pub fn set_mode(&mut self, mode: u8) -> bool {
        self.current.set_mode(mode)
    }

    /// Write the file to `writer`
    pub fn build<W: Write>(&self, writer: W) -> Result<W> {
        self.current.write(writer)
    }

    /// Write the file to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<&Self> {
        self.current.save(path)?;
        Ok(self)
    }
}

/// Replace every part of `text` that lowercases to `needle`, or `None` if there is none
fn replace_ignore_case(text: &str, needle: &str, replacement: &str) -> Option<String> {
    let mut result = String::with_capacity(text.len());
    let mut found = false;
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(length) = lowercase_prefix_len(rest, needle) {
            result.push_str(replacement);
            rest = &rest[length..];
            found = true;
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            result.push(c);
        }
        rest = chars.as_str();
    }

    found.then_some(result)
}

/// Byte length of the prefix of `text` that lowercases to `needle`
fn lowercase_prefix_len(text: &str, needle: &str) -> Option<usize> {
    let mut lowered = String::with_capacity(needle.len());
    for (index, c) in text.char_indices() {
        lowered.extend(c.to_lowercase());
        if !needle.starts_with(lowered.as_str()) {
            return None;
        }
        if lowered.len() == needle.len() {
            return Some(index + c.len_utf8());
        }
    }
    None
}
