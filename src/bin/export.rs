//! Schema Export CLI
//!
//! Generates the JSON Schema for a root class of a model file.

use anyhow::{anyhow, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uml_schemas::{sink, GeneratorConfig, InMemoryModel, OutputSink, SchemaGenerator};

#[derive(Parser)]
#[command(name = "uml-schema-export")]
#[command(about = "Generate a JSON Schema from a UML class model")]
struct Cli {
    /// Model file (JSON)
    #[arg(short, long)]
    model: PathBuf,

    /// Name of the root class
    #[arg(short, long)]
    root: String,

    /// Output file, used when the root has no file-name tag (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file to load on top of the default locations
    #[arg(short, long)]
    config: Option<String>,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,
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
    let model = InMemoryModel::load(&cli.model)
        .with_context(|| format!("loading model {}", cli.model.display()))?;

    let root = model
        .find_by_name(&cli.root)
        .ok_or_else(|| anyhow!("no element named {} in {}", cli.root, cli.model.display()))?
        .id
        .clone();

    let generator = SchemaGenerator::new(&model, &root, config.generator_options())?;
    let document = generator.generate()?;

    let pretty = config.output.format.is_pretty() && !cli.compact;
    let text = document.to_json_string(pretty)?;

    let path = sink::resolve_output_path(
        generator.root(),
        &config.vocabulary,
        cli.output.as_deref(),
        config.output.directory.as_deref(),
    );
    sink::sink_for(path).write(&text)?;
    Ok(())
}
