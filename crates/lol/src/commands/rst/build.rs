use clap::Args;
use lol_rst::RstFile;
use miette::{Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::PathBuf,
};
use tracing::info;

#[derive(Args)]
pub struct BuildArgs {
    /// An input JSON file, as written by `dump`
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// A target RST file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl BuildArgs {
    pub fn handle(&self) -> Result<()> {
        let f = File::open(&self.input)
            .into_diagnostic()
            .context(format!("path: {}", &self.input.display()))?;

        let rst: RstFile = serde_json::from_reader(BufReader::new(f))
            .into_diagnostic()
            .context(format!("parsing {}", &self.input.display()))?;

        info!(
            entries = rst.len(),
            version = %rst.version(),
            "creating {}",
            &self.output.display()
        );

        let out = super::create_file(&self.output, self.overwrite)?;
        rst.write(BufWriter::new(out)).context("finalizing rst file")?;

        Ok(())
    }
}
