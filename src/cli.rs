use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show repository objects of any type.
    CatFile(CatFileArgs),
    /// Read a single reference.
    ShowRef(ShowRefArgs),
    /// Create an empty repository.
    Init(InitArgs),
}

#[derive(Args)]
pub struct CatFileArgs {
    #[command(flatten)]
    pub mode: CatFileMode,

    pub id: String,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct CatFileMode {
    /// Pretty-print the object's contents.
    #[arg(short)]
    pub print: bool,

    /// Print the object's type.
    #[arg(short = 't')]
    pub kind: bool,

    /// Print the object's size.
    #[arg(short = 's')]
    pub size: bool,
}

#[derive(Args)]
pub struct ShowRefArgs {
    pub name: String,
}

#[derive(Args)]
pub struct InitArgs {
    #[arg(default_value = ".")]
    pub directory: String,

    #[arg(long, default_value = "main")]
    pub initial_branch: String,
}
