use clap::Args;
use lol_rst::RstFile;
use miette::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// An input RST file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Replace invalid UTF-8 in texts instead of failing
    #[arg(long, default_value_t = false)]
    lossy: bool,
}

fn describe(rst: &RstFile) -> Vec<String> {
    let layout = rst.version().layout();

    let mut lines = vec![
        format!("version: {}", rst.version()),
        format!(
            "type:    {} ({} bit hashes)",
            rst.rst_type(),
            rst.rst_type().bits()
        ),
    ];
    if layout.has_mode {
        lines.push(format!("mode:    {}", rst.mode()));
    }
    if layout.supports_config {
        match rst.config() {
            Some(config) => lines.push(format!("config:  {}", config.escape_debug())),
            None => lines.push(format!("config:  {}", "none".dimmed())),
        }
    }
    lines.push(format!("entries: {}", rst.len()));
    lines.push(format!("texts:   {}", rst.unique_texts()));
    lines
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let rst = super::open_rst(&self.file, self.lossy)?;

        println!("{}", self.file.display().bold());
        for line in describe(&rst) {
            println!("  {}", line);
        }

        Ok(())
    }
}
