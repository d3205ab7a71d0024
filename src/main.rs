mod cli;

use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use gitty::{GitError, Oid, RepoLayout, Repository};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::CatFile(args) => cat_file(args)?,
        Commands::ShowRef(args) => show_ref(args)?,
        Commands::Init(args) => init(args)?,
    }

    Ok(())
}

fn open_repository() -> Result<Repository, GitError> {
    let layout = RepoLayout::from_env().map_err(|e| GitError::io(".", "resolve GIT_DIR", e))?;
    Repository::open(layout)
}

fn cat_file(args: cli::CatFileArgs) -> Result<(), Box<dyn std::error::Error>> {
    let repo = open_repository()?;
    let oid = Oid::from_hex(&args.id)?;
    let object = repo.odb.get(&oid)?;

    let mut stdout = std::io::stdout();

    if args.mode.print {
        write!(stdout, "{object}")?;
    }
    if args.mode.kind {
        writeln!(stdout, "{}", object.object_type())?;
    }
    if args.mode.size {
        writeln!(stdout, "{}", object.content().len())?;
    }

    stdout.flush()?;
    Ok(())
}

fn show_ref(args: cli::ShowRefArgs) -> Result<(), Box<dyn std::error::Error>> {
    let repo = open_repository()?;
    let reference = repo.refs.reference(&args.name)?;
    println!("{} {}", reference.target(), reference.name());
    Ok(())
}

fn init(args: cli::InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let layout = RepoLayout::new(std::path::Path::new(&args.directory).join(".git"));
    Repository::init(layout, &args.initial_branch)?;
    println!("initialized repository in {}", args.directory);
    Ok(())
}
