use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[command(name = "permigrate")]
#[command(about = "Order permissions tables for migration by their foreign keys")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Increase verbosity level (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Generate a sample configuration file
    Init,
    /// Inspect the permissions schema and print a safe table insertion order
    Plan {
        /// URI of the permissions database (postgresql)
        #[arg(long)]
        permissions: Option<String>,

        /// URI of the destination database (postgresql)
        #[arg(long)]
        destination: Option<String>,

        /// Schema to use in the destination DB for the permissions tables
        #[arg(long)]
        permissions_schema: Option<String>,

        /// Schema to inspect in the permissions database
        #[arg(long)]
        schema: Option<String>,

        /// Ignore foreign keys that point outside the inspected tables instead of failing
        #[arg(long)]
        skip_dangling: bool,

        /// Output the table graph in Graphviz DOT format to the specified file
        #[arg(long)]
        output_graph: Option<PathBuf>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
