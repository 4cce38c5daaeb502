pub mod rst;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle RST string tables
    Rst {
        #[command(subcommand)]
        command: rst::RstCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Rst { command } => command.handle(),
        }
    }
}
