use std::{fs::File, path::Path};

use lol_rst::{RstFile, RstReaderOptions, TextPolicy};
use miette::{Context, IntoDiagnostic, Result};

pub mod build;
pub mod diff;
pub mod dump;
pub mod extract;
pub mod hash;
pub mod info;

#[derive(clap::Subcommand)]
pub enum RstCommands {
    /// Build a RST file from its JSON form
    Build(build::BuildArgs),
    /// Compare two RST files
    Diff(diff::DiffArgs),
    /// Dump a RST file as JSON
    Dump(dump::DumpArgs),
    /// Dump every RST file below a directory as JSON
    Extract(extract::ExtractArgs),
    /// Compute the hash of entry names
    Hash(hash::HashArgs),
    /// Show the header of a RST file
    Info(info::InfoArgs),
}

impl RstCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            RstCommands::Build(build) => build.handle(),
            RstCommands::Diff(diff) => diff.handle(),
            RstCommands::Dump(dump) => dump.handle(),
            RstCommands::Extract(extract) => extract.handle(),
            RstCommands::Hash(hash) => hash.handle(),
            RstCommands::Info(info) => info.handle(),
        }
    }
}

fn open_rst(path: &Path, lossy: bool) -> Result<RstFile> {
    let f = File::open(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))?;

    let options = RstReaderOptions::builder()
        .text_policy(if lossy {
            TextPolicy::Lossy
        } else {
            TextPolicy::Strict
        })
        .build();

    RstFile::read_with(f, options).context(format!("reading {}", path.display()))
}

fn create_file(path: &Path, overwrite: bool) -> Result<File> {
    if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    }
}
