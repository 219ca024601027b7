mod cli;

use hcl_autofill::config::AutoFillConfig;
use hcl_autofill::converter::{ConvertOptions, Converter};
use hcl_autofill::scanner::ReferenceScanner;
use hcl_autofill::source::DirectorySource;
use hcl_autofill::{AutoFiller, ResourceStore};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HCL_AUTOFILL_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        cli::Command::Fill(fill_cli) => fill(&config, fill_cli),
        cli::Command::Convert(convert_cli) => convert(&config, convert_cli),
        cli::Command::Dev(dev_cli) => dev(&config, dev_cli),
    });

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<AutoFillConfig> {
    match path {
        Some(path) => Ok(AutoFillConfig::load(path)?),
        None => Ok(AutoFillConfig::default()),
    }
}

pub fn fill(config: &AutoFillConfig, cli: cli::FillCommand) -> anyhow::Result<()> {
    let fragment = read_fragment(&cli.input)?;
    let store = load_store(config, &cli.input)?;

    let filled = AutoFiller::new(config).fill(&store, &fragment)?;

    match cli.output {
        Some(path) => std::fs::write(path, filled)?,
        None => print!("{filled}"),
    }

    Ok(())
}

pub fn convert(config: &AutoFillConfig, cli: cli::ConvertCommand) -> anyhow::Result<()> {
    let fragment = read_fragment(&cli.input)?;
    let store = load_store(config, &cli.input)?;

    let filled = AutoFiller::new(config).fill(&store, &fragment)?;

    let converter = Converter::new(cli.program, cli.from);
    let options = ConvertOptions::new(cli.language, cli.out).strict(cli.strict);
    converter.convert(&filled, &options)?;

    Ok(())
}

fn read_fragment(input: &cli::InputArgs) -> anyhow::Result<String> {
    match &input.file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(std::io::read_to_string(std::io::stdin())?),
    }
}

fn load_store(config: &AutoFillConfig, input: &cli::InputArgs) -> anyhow::Result<ResourceStore> {
    let mut store = ResourceStore::new(config);

    if input.stores.is_empty() {
        let source = DirectorySource::new(std::env::current_dir()?, &config.store.extensions);
        store.load(&source)?;
    }

    for dir_path in &input.stores {
        let source = DirectorySource::new(dir_path, &config.store.extensions);
        store.load(&source)?;
    }

    tracing::info!(
        definitions = store.len(),
        skipped = store.skipped().len(),
        "store loaded"
    );

    Ok(store)
}

fn output(format: &cli::OutputFormat, value: &impl serde::Serialize) -> anyhow::Result<()> {
    match format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}

/// (hcl-autofill-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(config: &AutoFillConfig, cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    match cli.command {
        Index => {
            let store = load_store(config, &cli.input)?;
            let definitions: Vec<_> = store.definitions().collect();
            output(&cli.format, &definitions)?;
        }
        Refs => {
            let fragment = read_fragment(&cli.input)?;
            let scan = ReferenceScanner::new(config).scan(&fragment)?;
            output(&cli.format, &scan)?;
        }
    }

    Ok(())
}
