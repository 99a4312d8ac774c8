use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use proposal_contracts::DeviceGraph;
use proposal_core::{
    GuidedStrategy, ProductConfig, ProposalStrategy, settings_from_wire, settings_to_engine,
    settings_to_wire,
};
use proposal_testing::spec;

#[derive(Debug, Parser)]
#[command(name = "proposal-lab")]
#[command(about = "Resolve storage proposal settings against simulated systems")]
struct LabCli {
    #[command(subcommand)]
    command: LabCommand,
}

#[derive(Debug, Subcommand)]
enum LabCommand {
    /// Print the volume templates of a product
    Templates {
        #[arg(long)]
        config: PathBuf,
    },
    /// Print the settings resolved from a wire document and their engine view
    Resolve {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        settings: PathBuf,
        /// Lab spec used to expand the space policy (name or path)
        #[arg(long)]
        spec: Option<String>,
    },
    /// Run the guided proposal against a lab spec
    Propose {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        settings: PathBuf,
        /// Lab spec name under resources/lab-specs, or a path
        #[arg(long)]
        spec: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(path: &Path) -> Result<ProductConfig> {
    ProductConfig::load(path).with_context(|| format!("loading product {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("proposal_core=info,warn")),
        )
        .init();

    let cli = LabCli::parse();

    match cli.command {
        LabCommand::Templates { config } => {
            let config = load_config(&config)?;
            let templates: Vec<_> = config
                .templates()
                .all()
                .iter()
                .map(proposal_core::conversions::volume_to_wire)
                .collect();
            print_json(&templates)
        }
        LabCommand::Resolve {
            config,
            settings,
            spec: spec_name,
        } => {
            let config = load_config(&config)?;
            let wire = spec::load_settings(&settings)?;
            let resolved = settings_from_wire(&wire, &config);

            let graph = match spec_name {
                Some(name) => spec::load(&name)?.device_graph(),
                None => DeviceGraph::default(),
            };
            let engine = settings_to_engine(&resolved, &config, &graph);

            print_json(&serde_json::json!({
                "settings": settings_to_wire(&resolved),
                "engine": engine,
            }))
        }
        LabCommand::Propose {
            config,
            settings,
            spec: spec_name,
        } => {
            let config = load_config(&config)?;
            let wire = spec::load_settings(&settings)?;
            let lab = spec::load(&spec_name)?;
            let engine = lab.engine();

            let requested = settings_from_wire(&wire, &config);
            let proposal = GuidedStrategy::new(&config, &engine).calculate(&requested);

            for issue in proposal.issues() {
                eprintln!("{issue}");
            }
            for volume in &proposal.settings().volumes {
                eprintln!(
                    "{}: {} to {}",
                    volume.mount_path,
                    volume.min_size.to_human_string_with_bytes(),
                    volume.max_size.to_human_string_with_bytes()
                );
            }
            print_json(&serde_json::json!({
                "success": proposal.succeeded(),
                "settings": settings_to_wire(proposal.settings()),
                "actions": proposal.actions(),
                "issues": proposal.issues(),
            }))
        }
    }
}
