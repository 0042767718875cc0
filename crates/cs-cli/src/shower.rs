use std::path::Path;

use anyhow::{Context, Result};
use cs_calo::{EventSource, RootEventSource, ShowerShapeTable};
use cs_viz_render::config::VizConfig;

pub(crate) struct Args<'a> {
    pub photon: &'a Path,
    pub pion: &'a Path,
    pub branch: &'a str,
    pub tree: &'a str,
    pub output: &'a Path,
    pub label: &'a str,
    pub json: Option<&'a Path>,
    pub viz: &'a VizConfig,
}

fn load_table(path: &Path, tree: &str, branch: &str) -> Result<ShowerShapeTable> {
    let source =
        RootEventSource::open(path, tree).with_context(|| format!("opening {}", path.display()))?;
    let params = source.jagged(branch).with_context(|| format!("reading {branch} from {}", path.display()))?;
    let table = ShowerShapeTable::from_jagged(&params);
    tracing::info!(
        path = %path.display(),
        events = table.n_events(),
        rejected = table.n_rejected(),
        "shape parameters decoded"
    );
    Ok(table)
}

pub(crate) fn run(args: &Args<'_>) -> Result<()> {
    let photon = load_table(args.photon, args.tree, args.branch)?;
    let pion = load_table(args.pion, args.tree, args.branch)?;

    let artifact = cs_viz::shower_shapes_artifact(&photon, &pion, args.label)
        .context("building shower-shape distributions")?;
    if let Some(path) = args.json {
        crate::write_json(path, &artifact)?;
    }
    cs_viz_render::render_shower_pdf(&artifact, args.output, args.viz)
        .with_context(|| format!("rendering {}", args.output.display()))?;
    tracing::info!(path = %args.output.display(), pages = artifact.layers.len(), "PDF written");
    Ok(())
}
