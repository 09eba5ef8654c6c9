//! Schema Config CLI
//!
//! Shows, writes and checks the generator configuration. `check` can also
//! preflight a model file: the configured vocabulary is used to validate the
//! root element the same way `uml-schema-export` would.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uml_schemas::{GeneratorConfig, InMemoryModel, SchemaGenerator};

#[derive(Parser)]
#[command(name = "uml-schema-config")]
#[command(about = "Inspect and check schema generator configuration")]
struct Cli {
    /// Config file to load on top of the default locations
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Show {
        #[arg(long, value_enum, default_value_t = ShowFormat::Summary)]
        format: ShowFormat,
    },

    /// Write the default configuration to a file
    Init {
        #[arg(short, long, default_value = "uml-schemas.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check the vocabulary, optionally against a model root
    Check {
        /// Model file (JSON) to preflight
        #[arg(short, long, requires = "root")]
        model: Option<PathBuf>,

        /// Name of the root class in the model
        #[arg(short, long, requires = "model")]
        root: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShowFormat {
    Summary,
    Toml,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = GeneratorConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Show { format } => match format {
            ShowFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
            ShowFormat::Toml => println!("{}", toml::to_string_pretty(&config)?),
            ShowFormat::Summary => print_summary(&config),
        },

        Commands::Init { output, force } => {
            if output.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", output.display());
            }
            let path = output
                .to_str()
                .ok_or_else(|| anyhow!("output path is not valid UTF-8"))?;
            GeneratorConfig::default().save(path)?;
            println!("Created config file: {}", output.display());
        }

        Commands::Check { model, root } => {
            config.validate()?;
            println!("Vocabulary is consistent");
            if let (Some(model), Some(root)) = (model, root) {
                preflight(&config, &model, &root)?;
                println!("Root {} in {} is ready for export", root, model.display());
            }
        }
    }

    Ok(())
}

fn print_summary(config: &GeneratorConfig) {
    let v = &config.vocabulary;
    println!("Stereotypes:");
    println!("  root       {}", v.qualified(&v.schema_root));
    println!("  class      {}", v.qualified(&v.element));
    println!("  data type  {}", v.qualified(&v.data_type));
    println!("  attribute  {}", v.qualified(&v.attribute));
    println!("Tags: dialect={} id={} file={}", v.dialect_tag, v.identifier_tag, v.output_file_tag);
    println!(
        "Definitions keyed by: arrays={:?} references={:?}",
        config.definitions.array_items, config.definitions.single_reference
    );
    match &config.output.directory {
        Some(dir) => println!("Output: {:?} into {}", config.output.format, dir.display()),
        None => println!("Output: {:?}", config.output.format),
    }
}

fn preflight(config: &GeneratorConfig, model_path: &Path, root: &str) -> anyhow::Result<()> {
    let model = InMemoryModel::load(model_path)
        .with_context(|| format!("loading model {}", model_path.display()))?;
    let root = model
        .find_by_name(root)
        .ok_or_else(|| anyhow!("no element named {} in {}", root, model_path.display()))?
        .id
        .clone();
    SchemaGenerator::new(&model, &root, config.generator_options())?;
    Ok(())
}
