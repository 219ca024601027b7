//! hcl-autofill cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; hcl-autofill ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    /// Load settings from an HCL config file
    #[clap(long = "config", global(true))]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append missing resource definitions to a fragment
    ///
    /// Reads the fragment from stdin unless --input-file is given
    Fill(FillCommand),

    /// Fill a fragment and run the converter on the result
    Convert(ConvertCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct FillCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Write the filled fragment to a file instead of stdout
    #[clap(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ConvertCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Converter executable
    #[clap(long = "program", default_value = "pulumi")]
    pub program: PathBuf,

    /// Source language passed to the converter
    #[clap(long = "from", default_value = "terraform")]
    pub from: String,

    /// Target language
    #[clap(short = 'l', long = "language")]
    pub language: String,

    /// Directory for the generated files
    #[clap(long = "out")]
    pub out: PathBuf,

    /// Let the converter fail on unsupported constructs
    #[clap(long = "strict")]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Read the fragment from a file
    #[clap(short = 'f', long = "input-file")]
    pub file: Option<PathBuf>,

    /// Directory to search for definitions
    ///
    /// Can be specified multiple times. Earlier directories take
    /// precedence. Defaults to the work directory.
    #[clap(short = 's', long = "store")]
    pub stores: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[arg(short = 'F', long = "output-format", default_value_t, global(true))]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Definitions found in the store
    Index,
    /// Definitions and references found in the fragment
    Refs,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}
