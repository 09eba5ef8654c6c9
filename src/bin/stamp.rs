//! Schema Stamp CLI
//!
//! Marks a package tree of a model file with the stereotypes schema
//! generation expects, then saves the model.

use anyhow::{anyhow, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uml_schemas::{GeneratorConfig, InMemoryModel, MetadataStamper};

#[derive(Parser)]
#[command(name = "uml-schema-stamp")]
#[command(about = "Stamp schema stereotypes onto a UML class model")]
struct Cli {
    /// Model file (JSON), rewritten in place
    #[arg(short, long)]
    model: PathBuf,

    /// Name of the package to walk
    #[arg(short, long)]
    package: String,

    /// Name of the class that becomes the schema root
    #[arg(short, long)]
    root: String,

    /// Config file to load on top of the default locations
    #[arg(short, long)]
    config: Option<String>,

    /// Dry run - report without saving the model file
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = GeneratorConfig::load_from(cli.config.as_deref())?;
    let mut model = InMemoryModel::load(&cli.model)
        .with_context(|| format!("loading model {}", cli.model.display()))?;

    let lookup = |name: &str| {
        model
            .find_by_name(name)
            .map(|e| e.id.clone())
            .ok_or_else(|| anyhow!("no element named {} in {}", name, cli.model.display()))
    };
    let package = lookup(&cli.package)?;
    let root = lookup(&cli.root)?;

    let report = MetadataStamper::new(&config.vocabulary).stamp(&mut model, &package, &root)?;

    println!("Stamped {}:", cli.package);
    println!("  Packages:           {}", report.packages);
    println!("  Classifiers:        {}", report.classifiers);
    println!("  Stereotypes added:  {}", report.stereotypes_added);
    println!("  Attributes stamped: {}", report.attributes_stamped);

    if cli.dry_run {
        println!("Dry run - model not saved");
        return Ok(());
    }

    model.save_to(&cli.model)?;
    println!("Saved {}", cli.model.display());
    Ok(())
}
