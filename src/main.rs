use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use istar_uvl::{MappingSet, MappingTable, transform};

#[derive(Parser)]
#[command(name = "istar-uvl")]
#[command(about = "Transform an i* 2.0 diagram export into a UVL feature model")]
struct Cli {
    /// Input diagram XML file
    input: PathBuf,

    /// Output UVL file
    output: PathBuf,

    /// Directory holding the mapping tables (algorithms.txt, nfrs.txt,
    /// backend.txt, integration.txt)
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,
}

/// Initialize tracing on stderr so stdout stays clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "istar_uvl=info".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load one mapping table. A missing or unreadable file is a warning,
/// not an error: classification simply finds nothing in an empty table.
fn load_table(dir: &Path, name: &str) -> MappingTable {
    let path = dir.join(format!("{name}.txt"));
    match fs::read_to_string(&path) {
        Ok(text) => MappingTable::parse(&text),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                %err,
                "mapping file unavailable, continuing with an empty table"
            );
            MappingTable::new()
        }
    }
}

fn load_mapping_set(dir: &Path) -> MappingSet {
    MappingSet {
        algorithms: load_table(dir, "algorithms"),
        nfrs: load_table(dir, "nfrs"),
        backend: load_table(dir, "backend"),
        integration: load_table(dir, "integration"),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mappings = load_mapping_set(&cli.config_dir);
    let input = fs::read(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    // The output file is only touched after the whole transformation
    // succeeded; a failed run never leaves a partial file behind.
    let uvl = transform(&input, &mappings)?;
    fs::write(&cli.output, uvl)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    tracing::info!(output = %cli.output.display(), "UVL model written");
    Ok(())
}
