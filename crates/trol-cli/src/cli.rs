use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "trol",
    about = "Read and write trol properties in a directory-backed store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store directory; overrides `store.root` from the config file
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CodecKind {
    Str,
    Int,
    Float,
    /// Hex on the command line, raw bytes in the store
    Bytes,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read a property
    Get(GetArgs),
    /// Write a property
    Set(SetArgs),
    /// Delete a property
    Del(TargetArgs),
    /// Check whether a property exists in the store
    Exists(TargetArgs),
}

#[derive(Args)]
pub struct TargetArgs {
    /// Property name
    pub name: String,
    /// Owner key the property lives under
    #[arg(long)]
    pub owner: Option<String>,
    #[arg(long, value_enum, default_value = "str")]
    pub codec: CodecKind,
}

#[derive(Args)]
pub struct GetArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Always go to the store
    #[arg(long)]
    pub fresh: bool,
}

#[derive(Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    pub value: String,
}

impl Command {
    pub fn target(&self) -> &TargetArgs {
        match self {
            Command::Get(args) => &args.target,
            Command::Set(args) => &args.target,
            Command::Del(target) | Command::Exists(target) => target,
        }
    }
}
