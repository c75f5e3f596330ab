//! Swatches command line driver.
//!
//! Classifies the rooted neighborhoods of one or more networks (each file a
//! data preparation, tagged in its header), then writes the distribution,
//! a readable report and the requested comparison metrics.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (default: swatches=info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for terminals (default: pretty)
//!
//! ## Usage
//!
//! ```bash
//! swatches -f glass_a.txt,glass_b.txt -t 2 -r 5 -s 14 -p 2 -k -e -o glass
//! swatches --config policy.json -f glass_a.txt -o glass
//! swatches --load glass.dat -f glass_c.txt -o glass_abc
//! ```
//!
//! Outputs `<out>.dat`, `<out>.txt` and, when requested, `<out>_L<p>.txt`,
//! `<out>_KL.txt`, `<out>_shannonEntropy_unrescaled.txt`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use swatches::analysis::{write_matrix, write_vector};
use swatches::{ClassificationPolicy, ClassificationType, EmpiricalDistribution, Network, RootSelection};

#[derive(Parser, Debug)]
#[command(name = "swatches", version, about = "Classify rooted network neighborhoods")]
struct Cli {
    /// Network files, comma separated (one data preparation each)
    #[arg(short = 'f', long = "files", value_delimiter = ',', value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Equivalence type: 0 canonical form, 1 H1 barcode, 2 primitive rings,
    /// 3 valence profile, 4 shell count
    #[arg(short = 't', long = "type", default_value_t = 0)]
    classification: i64,

    /// Radius of the rooted neighborhoods
    #[arg(short = 'r', long, default_value_t = 3)]
    radius: usize,

    /// Root selection: color >= 0, -1 all vertices, -2 ideal silica coordination
    #[arg(short = 's', long, default_value_t = -1, allow_negative_numbers = true)]
    selection: i64,

    /// Exponent of the Lp distance between preparations
    #[arg(short = 'p', long = "lp", value_parser = clap::value_parser!(u32).range(1..))]
    lp: Option<u32>,

    /// Compute KL divergences between preparations
    #[arg(short = 'k', long = "kl")]
    kl: bool,

    /// Compute the Shannon entropy of each preparation
    #[arg(short = 'e', long = "entropy")]
    entropy: bool,

    /// Output prefix (default: first network file)
    #[arg(short = 'o', long = "output", value_name = "PREFIX")]
    output: Option<String>,

    /// JSON policy file; overrides -t, -r and -s
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Continue from a saved distribution
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,
}

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "swatches=info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_span_events(FmtSpan::CLOSE))
            .init();
    }
}

fn policy_from(cli: &Cli) -> Result<ClassificationPolicy> {
    if let Some(path) = &cli.config {
        return ClassificationPolicy::load(path).with_context(|| format!("Failed to load policy {}", path.display()));
    }
    if cli.radius == 0 {
        bail!("Radius must be positive");
    }
    let classification = ClassificationType::from_code(cli.classification)?;
    let selection = RootSelection::from_code(cli.selection)?;
    let policy = ClassificationPolicy::new(classification, cli.radius, selection);
    policy.validate()?;
    Ok(policy)
}

fn output_prefix(cli: &Cli) -> Result<String> {
    if let Some(out) = &cli.output {
        return Ok(out.clone());
    }
    let first = cli
        .files
        .first()
        .or(cli.load.as_ref())
        .context("No output prefix and no input file to derive one from")?;
    Ok(strip_dat(first).display().to_string())
}

fn strip_dat(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "dat") {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.files.is_empty() && cli.load.is_none() {
        bail!("Provide at least one network file (-f) or a saved distribution (--load)");
    }

    let mut distribution = match &cli.load {
        Some(path) => {
            if cli.config.is_some() {
                warn!("Policy of the loaded distribution takes precedence over --config");
            }
            EmpiricalDistribution::load(path)?
        }
        None => EmpiricalDistribution::new(policy_from(&cli)?)?,
    };

    let policy = distribution.policy();
    info!(
        schema_version = swatches::SWATCHES_SCHEMA_VERSION,
        params_hash = %policy.params_hash(),
        radius = policy.radius,
        selection = %policy.selection,
        "Classifying environments up to {}",
        policy.classification.describe()
    );
    if policy.selection.is_explicit() {
        warn!("Explicit root selection has no ids on the command line, no roots will be classified");
    }

    for (index, file) in cli.files.iter().enumerate() {
        let network = Network::load(file)?;
        let update = distribution
            .compute(&network, &[])
            .with_context(|| format!("Failed to classify {}", file.display()))?;
        info!(
            index,
            file = %file.display(),
            preparation = update.preparation,
            fingerprint = %update.network_fingerprint,
            roots = update.roots,
            new_classes = update.new_classes,
            "Network processed"
        );
    }
    info!(classes = distribution.len(), preparations = distribution.num_preps(), "Computation complete");

    let out = output_prefix(&cli)?;

    if let Some(p) = cli.lp {
        let path = format!("{out}_L{p}.txt");
        write_matrix(&path, &distribution.lp_distance(p)).with_context(|| format!("Failed to write {path}"))?;
        info!(path = %path, "L{} distances saved", p);
    }
    if cli.entropy {
        let path = format!("{out}_shannonEntropy_unrescaled.txt");
        write_vector(&path, &distribution.shannon_entropy()).with_context(|| format!("Failed to write {path}"))?;
        info!(path = %path, "Shannon entropies saved");
    }
    if cli.kl {
        let path = format!("{out}_KL.txt");
        write_matrix(&path, &distribution.kl_divergence()).with_context(|| format!("Failed to write {path}"))?;
        info!(path = %path, "KL divergences saved");
    }

    distribution.save(format!("{out}.dat"))?;
    distribution.save_report(format!("{out}.txt"))?;
    info!(prefix = %out, "Empirical distribution saved");
    Ok(())
}
