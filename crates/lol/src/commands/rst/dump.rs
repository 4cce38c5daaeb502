use clap::Args;
use miette::{IntoDiagnostic, Result};
use std::{
    io::{BufWriter, Write},
    path::PathBuf,
};
use tracing::info;

#[derive(Args)]
pub struct DumpArgs {
    /// An input RST file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target JSON file, stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Replace invalid UTF-8 in texts instead of failing
    #[arg(long, default_value_t = false)]
    lossy: bool,
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        let rst = super::open_rst(&self.file, self.lossy)?;

        match &self.output {
            Some(path) => {
                info!("writing {}", path.display());
                let mut out = BufWriter::new(super::create_file(path, self.overwrite)?);
                serde_json::to_writer_pretty(&mut out, &rst).into_diagnostic()?;
                writeln!(out).into_diagnostic()?;
                out.flush().into_diagnostic()?;
            }
            None => {
                println!("{}", serde_json::to_string_pretty(&rst).into_diagnostic()?);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use lol_rst::{RstFile, RstVersion};

    #[test]
    fn dump_writes_json() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("lol_dump_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).into_diagnostic()?;

        let mut rst = RstFile::new(RstVersion::V2);
        rst.set_config("fonts");
        rst.insert(0x1F, "Hello")?;
        rst.save(dir.join("table.stringtable"))?;

        let args = DumpArgs {
            file: dir.join("table.stringtable"),
            output: Some(dir.join("table.json")),
            overwrite: false,
            lossy: false,
        };
        args.handle()?;

        // refuses to replace the dump without --overwrite
        assert!(args.handle().is_err());

        let json = std::fs::read_to_string(dir.join("table.json")).into_diagnostic()?;
        std::fs::remove_dir_all(&dir).into_diagnostic()?;

        let value: serde_json::Value = serde_json::from_str(&json).into_diagnostic()?;
        assert_eq!(value["version"], 2);
        assert_eq!(value["config"], "fonts");
        assert_eq!(value["entries"]["0x000000001f"], "Hello");

        Ok(())
    }
}
