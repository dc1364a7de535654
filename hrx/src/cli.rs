use std::path::PathBuf;

use structopt::clap::AppSettings::*;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "hrx",
    about = "Create, list and extract HRX human-readable archives.",
    settings = &[SubcommandRequiredElseHelp, DisableHelpSubcommand, VersionlessSubcommands]
)]
pub struct CliOpts {
    #[structopt(short, long, help = "Show verbose output", global = true)]
    pub verbose: bool,

    #[structopt(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, StructOpt)]
pub enum Commands {
    #[structopt(name = "create", visible_alias = "c", about = "Create a new archive")]
    Create(CreateArgs),

    #[structopt(
        name = "extract",
        visible_alias = "x",
        about = "Extract files from an archive"
    )]
    Extract(ExtractArgs),

    #[structopt(name = "list", visible_alias = "l", about = "List entries of an archive")]
    List(ListArgs),
}

#[derive(Debug, StructOpt)]
pub struct CreateArgs {
    #[structopt(short, long, help = "Overwrite an existing archive")]
    pub force: bool,

    #[structopt(
        short = "R",
        long,
        parse(from_os_str),
        help = "Store paths relative to this directory"
    )]
    pub root: Option<PathBuf>,

    #[structopt(name = "hrxfile", parse(from_os_str), help = "Path to the .hrx archive")]
    pub archive: PathBuf,

    #[structopt(
        name = "paths",
        parse(from_os_str),
        help = "Files and directories to archive"
    )]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct ExtractArgs {
    #[structopt(
        short,
        long,
        parse(from_os_str),
        help = "Output directory [default: current directory]"
    )]
    pub directory: Option<PathBuf>,

    #[structopt(
        long,
        default_value = "0",
        help = "Number of leading path components to strip"
    )]
    pub level: usize,

    #[structopt(short, long, help = "Overwrite existing files")]
    pub force: bool,

    #[structopt(name = "hrxfile", parse(from_os_str), help = "Path to the .hrx archive")]
    pub archive: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct ListArgs {
    #[structopt(name = "hrxfile", parse(from_os_str), help = "Path to the .hrx archive")]
    pub archive: PathBuf,
}
