use clap::Args;
use lol_rst::{error::Error, RstFile};
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let files = WalkDir::new(&self.directory)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(miette!("directory is empty"));
        }

        let mut extracted = 0;
        for file in files {
            let name = file
                .path()
                .strip_prefix(&self.directory)
                .into_diagnostic()?;

            let f = File::open(file.path())
                .into_diagnostic()
                .context(format!("opening {}", file.path().display()))?;

            let rst = match RstFile::read(f) {
                Ok(rst) => rst,
                Err(Error::InvalidFormat { .. }) | Err(Error::UnexpectedEndOfData) => {
                    debug!("skipping {}", name.display());
                    continue;
                }
                Err(e) => {
                    warn!("unable to read {}: {}", name.display(), e);
                    continue;
                }
            };

            let mut target = self.output.join(name).into_os_string();
            target.push(".json");
            let p = PathBuf::from(target);
            info!("writing {}", p.display());

            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)
                    .into_diagnostic()
                    .context(format!("creating {}", parent.display()))?;
            }

            let mut out = BufWriter::new(super::create_file(&p, self.overwrite)?);
            serde_json::to_writer_pretty(&mut out, &rst).into_diagnostic()?;
            writeln!(out).into_diagnostic()?;
            out.flush().into_diagnostic()?;
            extracted += 1;
        }

        info!("extracted {} string tables", extracted);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use lol_rst::RstVersion;

    #[test]
    fn extract_skips_other_files() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("lol_extract_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let input = dir.join("input");
        let output = dir.join("output");
        std::fs::create_dir_all(input.join("menu")).into_diagnostic()?;

        let mut rst = RstFile::new(RstVersion::V5);
        rst.insert_named("menu_play", "Play")?;
        rst.save(input.join("menu").join("bootstrap.stringtable"))?;
        std::fs::write(input.join("notes.txt"), "not a string table").into_diagnostic()?;
        std::fs::write(input.join("short.bin"), b"RS").into_diagnostic()?;

        let args = ExtractArgs {
            directory: input.clone(),
            output: output.clone(),
            overwrite: false,
        };
        args.handle()?;

        let dumped = output.join("menu").join("bootstrap.stringtable.json");
        let decoded: RstFile =
            serde_json::from_reader(File::open(&dumped).into_diagnostic()?).into_diagnostic()?;
        let skipped_text = output.join("notes.txt.json").exists();
        let skipped_short = output.join("short.bin.json").exists();
        std::fs::remove_dir_all(&dir).into_diagnostic()?;

        assert_eq!(decoded, rst);
        assert!(!skipped_text);
        assert!(!skipped_short);

        Ok(())
    }

    #[test]
    fn extract_rejects_empty_directory() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("lol_extract_empty_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).into_diagnostic()?;

        let args = ExtractArgs {
            directory: dir.clone(),
            output: dir.join("output"),
            overwrite: false,
        };
        let result = args.handle();
        std::fs::remove_dir_all(&dir).into_diagnostic()?;

        assert!(result.is_err());

        Ok(())
    }
}
