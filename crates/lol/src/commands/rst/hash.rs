use clap::{Args, ValueEnum};
use lol_rst::{
    hash::{compute_hash, compute_hash_with_offset},
    RstType,
};
use miette::Result;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum HashType {
    /// 39 bit hashes of versions 4 and 5
    #[default]
    Simple,
    /// 40 bit hashes of versions 2 and 3
    Complex,
}

impl From<HashType> for RstType {
    fn from(value: HashType) -> Self {
        match value {
            HashType::Simple => RstType::Simple,
            HashType::Complex => RstType::Complex,
        }
    }
}

#[derive(Args)]
pub struct HashArgs {
    /// Width of the hash
    #[arg(short = 't', long = "type", value_enum, default_value_t = HashType::Simple)]
    hash_type: HashType,

    /// Pack the hash together with a data offset
    #[arg(long)]
    offset: Option<u64>,

    /// Entry names to hash
    #[arg(required = true)]
    names: Vec<String>,
}

impl HashArgs {
    fn hash(&self, name: &str) -> Result<u64> {
        let rst_type = RstType::from(self.hash_type);
        Ok(match self.offset {
            Some(offset) => compute_hash_with_offset(name, offset, rst_type)?,
            None => compute_hash(name, rst_type),
        })
    }

    pub fn handle(&self) -> Result<()> {
        for name in &self.names {
            println!("{:#012x}  {}", self.hash(name)?, name);
        }

        Ok(())
    }
}
