//! Conversion of string tables into [`polars`] data frames

use polars::prelude::*;

use crate::types::RstFile;

impl RstFile {
    /// Collect the entries into a frame with a `hash` and a `text` column, in insertion order.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let hashes: Vec<u64> = self.keys().copied().collect();
        let texts: Vec<&str> = self.values().map(String::as_str).collect();

        df!(
            "hash" => hashes,
            "text" => texts
        )
    }
}

#[cfg(test)]
mod test {
    use crate::types::{RstFile, RstVersion};

    #[test]
    fn frame_has_one_row_per_entry() -> crate::error::Result<()> {
        let mut rst = RstFile::new(RstVersion::V5);
        rst.insert(1, "one")?;
        rst.insert(2, "two")?;

        let frame = rst.to_dataframe().expect("frame should build");
        assert_eq!(frame.shape(), (2, 2));
        assert!(frame.column("hash").is_ok());
        assert!(frame.column("text").is_ok());

        Ok(())
    }
}
