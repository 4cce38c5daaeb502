use indexmap::IndexMap;
use std::fmt;

use serde::{
    de::{self, MapAccess, Visitor},
    ser::{SerializeMap, SerializeStruct},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{
    error::Error,
    types::{RstFile, RstVersion},
};

/// Serializes as `{ "version": 5, "config": null, "mode": 0, "entries": { "0x0000000001": "text" } }`
impl Serialize for RstFile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("RstFile", 4)?;
        state.serialize_field("version", &u8::from(self.version()))?;
        state.serialize_field("config", &self.config())?;
        state.serialize_field("mode", &self.mode())?;
        state.serialize_field("entries", &HexEntries(self.entries()))?;
        state.end()
    }
}

struct HexEntries<'a>(&'a IndexMap<u64, String>);

impl Serialize for HexEntries<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (hash, text) in self.0 {
            map.serialize_entry(&format!("{hash:#012x}"), text)?;
        }
        map.end()
    }
}

struct HexEntriesVisitor {}

impl HexEntriesVisitor {
    fn new() -> Self {
        HexEntriesVisitor {}
    }
}

impl<'de> Visitor<'de> for HexEntriesVisitor {
    type Value = IndexMap<u64, String>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of hex hashes to strings")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));

        while let Some(key) = access.next_key::<String>()? {
            let hash = parse_hash(&key)
                .ok_or_else(|| de::Error::custom(format!("invalid hash `{key}`")))?;
            let value = access.next_value::<String>()?;

            map.insert(hash, value);
        }

        Ok(map)
    }
}

fn parse_hash(key: &str) -> Option<u64> {
    match key
        .strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => key.parse().ok(),
    }
}

fn deserialize_entries<'de, D>(deserializer: D) -> Result<IndexMap<u64, String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_map(HexEntriesVisitor::new())
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RstDocument {
    version: u8,
    #[serde(default)]
    config: Option<String>,
    #[serde(default)]
    mode: u8,
    #[serde(default, deserialize_with = "deserialize_entries")]
    entries: IndexMap<u64, String>,
}

impl TryFrom<RstDocument> for RstFile {
    type Error = Error;

    fn try_from(document: RstDocument) -> Result<Self, Self::Error> {
        let version = RstVersion::try_from(document.version)?;
        let mut rst = RstFile::new(version);

        if let Some(config) = document.config {
            if !config.is_empty() && !version.layout().supports_config {
                return Err(Error::InvalidArgument(format!(
                    "version {version} cannot carry a config"
                )));
            }
            rst.set_config(config);
        }

        if document.mode != 0 && !rst.set_mode(document.mode) {
            return Err(Error::InvalidArgument(format!(
                "version {version} cannot carry a mode"
            )));
        }

        for (hash, text) in document.entries {
            rst.insert(hash, text)?;
        }

        Ok(rst)
    }
}

impl<'de> Deserialize<'de> for RstFile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RstDocument::deserialize(deserializer)?
            .try_into()
            .map_err(de::Error::custom)
    }
}
