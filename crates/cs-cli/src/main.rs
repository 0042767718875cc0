//! calostat CLI

mod energy_res;
mod shower;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cs_viz_render::config::{VizConfig, resolve_config};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "calostat")]
#[command(about = "calostat - calorimeter energy response and shower-shape studies")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    /// YAML file with plot theme overrides
    #[arg(long, global = true)]
    viz_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Energy response and resolution vs truth energy, per cluster collection
    EnergyRes {
        /// Input directory (positional form)
        #[arg(value_name = "INDIR")]
        indir_pos: Option<PathBuf>,

        /// Input directory; takes precedence over the positional form
        #[arg(short, long)]
        indir: Option<PathBuf>,

        /// Output CSV table
        #[arg(short = 'o', long, default_value = "energy_perf_LArPb.csv")]
        csv: PathBuf,

        /// Output figure (.png, .svg or .pdf)
        #[arg(short, long, default_value = "energy_perf_LArPb.png")]
        png: PathBuf,

        /// Cluster-energy branches to compare
        #[arg(
            short,
            long,
            num_args = 1..,
            default_values_t = [
                "AugmentedEMBCaloClusters.energy".to_string(),
                "AugmentedEMBCaloTopoClusters.energy".to_string(),
            ]
        )]
        branches: Vec<String>,

        /// File-name wildcard (`*`, `?`) selecting input files
        #[arg(
            short = 'P',
            long,
            default_value = "ALLEGRO_RECO_1000evt_*GeV_photon_stripseverywhere_LAr_Pb.root"
        )]
        pattern: String,

        /// Tree name
        #[arg(long, default_value = "events")]
        tree: String,

        /// Threads (0 = auto)
        #[arg(long, default_value = "0")]
        threads: usize,

        /// Also write the plotted series as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Photon vs neutral-pion shower-shape comparison, one PDF page per layer
    ShowerShapes {
        /// Photon sample
        #[arg(long, default_value = "ALLEGRO_RECO_1000evt_50GeV_photon_theta90_stripseverywhere.root")]
        photon: PathBuf,

        /// Neutral-pion sample
        #[arg(long, default_value = "ALLEGRO_RECO_1000evt_50GeV_pi0_theta90_stripseverywhere.root")]
        pion: PathBuf,

        /// Branch with the flattened shape parameters
        #[arg(long, default_value = "_AugmentedEMBCaloClusters_shapeParameters")]
        branch: String,

        /// Tree name
        #[arg(long, default_value = "events")]
        tree: String,

        /// Output multi-page PDF
        #[arg(short, long, default_value = "50GeV_Filtered_AllLayers.pdf")]
        output: PathBuf,

        /// Sample label used in page titles
        #[arg(long, default_value = "50GeV")]
        label: String,

        /// Threads (0 = auto)
        #[arg(long, default_value = "0")]
        threads: usize,

        /// Also write the per-layer distributions as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Print version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::EnergyRes {
            indir_pos,
            indir,
            csv,
            png,
            branches,
            pattern,
            tree,
            threads,
            json,
        } => {
            let Some(indir) = indir.or(indir_pos) else {
                use clap::CommandFactory;
                Cli::command()
                    .error(
                        clap::error::ErrorKind::MissingRequiredArgument,
                        "an input directory is required (INDIR or --indir)",
                    )
                    .exit();
            };
            init_threads(threads);
            let viz = load_viz_config(cli.viz_config.as_deref())?;
            energy_res::run(&energy_res::Args {
                indir: &indir,
                csv: &csv,
                figure: &png,
                branches: &branches,
                pattern: &pattern,
                tree: &tree,
                json: json.as_deref(),
                viz: &viz,
            })
        }
        Commands::ShowerShapes { photon, pion, branch, tree, output, label, threads, json } => {
            init_threads(threads);
            let viz = load_viz_config(cli.viz_config.as_deref())?;
            shower::run(&shower::Args {
                photon: &photon,
                pion: &pion,
                branch: &branch,
                tree: &tree,
                output: &output,
                label: &label,
                json: json.as_deref(),
                viz: &viz,
            })
        }
        Commands::Version => {
            println!("calostat {}", cs_core::VERSION);
            Ok(())
        }
    }
}

fn init_threads(threads: usize) {
    if threads > 0 {
        // Best-effort; if a global pool already exists, keep going.
        let _ = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global();
    }
}

fn load_viz_config(path: Option<&Path>) -> Result<VizConfig> {
    let yaml = path
        .map(|p| std::fs::read_to_string(p).with_context(|| format!("reading viz config {}", p.display())))
        .transpose()?;
    resolve_config(yaml.as_deref()).context("invalid viz config")
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "JSON written");
    Ok(())
}
