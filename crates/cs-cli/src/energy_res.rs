use std::path::Path;

use anyhow::{Context, Result};
use cs_calo::{Chi2GaussianFitter, RootEventSource, discover_inputs, scan_files};
use cs_viz_render::config::VizConfig;

pub(crate) struct Args<'a> {
    pub indir: &'a Path,
    pub csv: &'a Path,
    pub figure: &'a Path,
    pub branches: &'a [String],
    pub pattern: &'a str,
    pub tree: &'a str,
    pub json: Option<&'a Path>,
    pub viz: &'a VizConfig,
}

pub(crate) fn run(args: &Args<'_>) -> Result<()> {
    let inputs = discover_inputs(args.indir, args.pattern)
        .with_context(|| format!("discovering inputs in {}", args.indir.display()))?;
    tracing::info!(
        dir = %args.indir.display(),
        files = inputs.len(),
        collections = args.branches.len(),
        "starting energy scan"
    );

    let fitter = Chi2GaussianFitter::default();
    let table = scan_files(&inputs, args.branches, |path| RootEventSource::open(path, args.tree), &fitter)
        .context("energy scan failed")?;

    for (collection, points) in &table.collections {
        for (input, p) in inputs.iter().zip(points) {
            tracing::info!(
                path = %input.path.display(),
                collection = %collection,
                truth_gev = p.truth_gev,
                mean = p.mean,
                sigma = p.sigma,
                n_pass = p.n_pass,
                "response point"
            );
        }
    }

    table.write_csv_path(args.csv).with_context(|| format!("writing {}", args.csv.display()))?;
    tracing::info!(path = %args.csv.display(), rows = table.n_rows(), "CSV written");

    let artifact = cs_viz::response_curves_artifact(&table);
    if let Some(path) = args.json {
        crate::write_json(path, &artifact)?;
    }
    cs_viz_render::render_response_to_file(&artifact, args.figure, args.viz)
        .with_context(|| format!("rendering {}", args.figure.display()))?;
    tracing::info!(path = %args.figure.display(), "figure written");
    Ok(())
}
