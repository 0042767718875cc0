//! Response scan over files and collections, and the summary table.

use std::io::Write;
use std::path::{Path, PathBuf};

use cs_core::{Error, GaussianFitter, Result};
use serde::{Deserialize, Serialize};

use crate::response::{ResponsePoint, process_collection};
use crate::source::EventSource;

/// Header row of the summary CSV.
pub const CSV_HEADER: [&str; 5] =
    ["ClusterType", "E_truth_GeV", "response_mean", "resolution_sigma_over_E", "NeventsPass"];

/// One input file with its truth energy.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanInput {
    /// File path.
    pub path: PathBuf,
    /// Truth energy (GeV) deduced from the file name.
    pub truth_gev: f64,
}

/// Response points per collection, collections in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTable {
    /// `(collection, points ordered by truth energy)`.
    pub collections: Vec<(String, Vec<ResponsePoint>)>,
}

impl ResponseTable {
    /// Points of one collection.
    pub fn points(&self, collection: &str) -> Option<&[ResponsePoint]> {
        self.collections.iter().find(|(name, _)| name == collection).map(|(_, p)| p.as_slice())
    }

    /// Collection names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.collections.iter().map(|(name, _)| name.as_str())
    }

    /// Total number of rows the CSV will hold.
    pub fn n_rows(&self) -> usize {
        self.collections.iter().map(|(_, p)| p.len()).sum()
    }

    /// Write the summary CSV: one row per (collection, file).
    pub fn write_csv<W: Write>(&self, out: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(CSV_HEADER).map_err(csv_err)?;
        for (name, points) in &self.collections {
            for p in points {
                wtr.write_record(&[
                    name.clone(),
                    format!("{}", p.truth_gev),
                    format!("{:.6}", p.mean),
                    format!("{:.6}", p.sigma),
                    p.n_pass.to_string(),
                ])
                .map_err(csv_err)?;
            }
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the summary CSV to a file.
    pub fn write_csv_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_csv(std::io::BufWriter::new(file))
    }
}

fn csv_err(e: csv::Error) -> Error {
    Error::Csv(e.to_string())
}

/// Fit every collection in every input.
///
/// Inputs are processed in the given order (callers sort them by truth
/// energy); each file is opened once with `open`. The first failure aborts the
/// scan.
pub fn scan_files<S, O, F>(
    inputs: &[ScanInput],
    collections: &[String],
    mut open: O,
    fitter: &F,
) -> Result<ResponseTable>
where
    S: EventSource,
    O: FnMut(&Path) -> Result<S>,
    F: GaussianFitter + ?Sized,
{
    if collections.is_empty() {
        return Err(Error::Validation("no collections requested".into()));
    }
    let sources = inputs.iter().map(|input| open(&input.path)).collect::<Result<Vec<S>>>()?;

    let mut table = ResponseTable::default();
    for collection in collections {
        let mut points = Vec::with_capacity(inputs.len());
        for (input, source) in inputs.iter().zip(&sources) {
            let point = process_collection(source, collection, input.truth_gev, fitter)?;
            log::debug!(
                "{} [{}] E={} GeV: mean={:.5} sigma/E={:.5} pass={}",
                input.path.display(),
                collection,
                input.truth_gev,
                point.mean,
                point.sigma,
                point.n_pass
            );
            points.push(point);
        }
        table.collections.push((collection.clone(), points));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryEventSource;
    use cs_core::{GaussianFit, GaussianSeed, Histogram1D};
    use std::collections::HashMap;

    struct SeedFitter;

    impl GaussianFitter for SeedFitter {
        fn fit(&self, _h: &Histogram1D, seed: &GaussianSeed, _w: (f64, f64)) -> Result<GaussianFit> {
            Ok(GaussianFit {
                constant: seed.constant,
                mean: seed.mean,
                sigma: seed.sigma,
                chi2: 0.0,
                ndf: 0,
                converged: true,
            })
        }

        fn name(&self) -> &str {
            "seed"
        }
    }

    fn sources() -> HashMap<PathBuf, MemoryEventSource> {
        let mk = |truth: f64| {
            MemoryEventSource::new()
                .with_rows("A.energy", vec![vec![truth * 0.98], vec![truth * 1.02], vec![0.05]])
                .unwrap()
                .with_rows("B.energy", vec![vec![truth * 0.9, 0.2], vec![truth * 1.1], vec![truth]])
                .unwrap()
        };
        HashMap::from([(PathBuf::from("f_10GeV.root"), mk(10.0)), (PathBuf::from("f_50GeV.root"), mk(50.0))])
    }

    fn inputs() -> Vec<ScanInput> {
        vec![
            ScanInput { path: "f_10GeV.root".into(), truth_gev: 10.0 },
            ScanInput { path: "f_50GeV.root".into(), truth_gev: 50.0 },
        ]
    }

    fn run(collections: &[&str]) -> Result<ResponseTable> {
        let srcs = sources();
        let names: Vec<String> = collections.iter().map(|s| s.to_string()).collect();
        scan_files(
            &inputs(),
            &names,
            |p| srcs.get(p).cloned().ok_or_else(|| Error::Validation(p.display().to_string())),
            &SeedFitter,
        )
    }

    #[test]
    fn collections_and_files_keep_order() {
        let table = run(&["B.energy", "A.energy"]).unwrap();
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["B.energy", "A.energy"]);
        let truths: Vec<f64> = table.points("A.energy").unwrap().iter().map(|p| p.truth_gev).collect();
        assert_eq!(truths, vec![10.0, 50.0]);
        assert_eq!(table.points("A.energy").unwrap()[0].n_pass, 2);
        assert_eq!(table.points("B.energy").unwrap()[0].n_pass, 3);
        assert_eq!(table.n_rows(), 4);
    }

    #[test]
    fn csv_layout() {
        let table = run(&["A.energy", "B.energy"]).unwrap();
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ClusterType,E_truth_GeV,response_mean,resolution_sigma_over_E,NeventsPass");
        assert_eq!(lines.len(), 1 + 4);
        assert!(lines[1].starts_with("A.energy,10,"));
        assert!(lines[2].starts_with("A.energy,50,"));
        assert!(lines[3].starts_with("B.energy,10,"));
        assert!(lines[1].ends_with(",2"));
    }

    #[test]
    fn csv_number_format() {
        let point = ResponsePoint { truth_gev: 0.5, mean: -0.0123456789, sigma: 0.1, raw_sigma: 0.1, n_pass: 7 };
        let table = ResponseTable { collections: vec![("A.energy".into(), vec![point])] };
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().nth(1), Some("A.energy,0.5,-0.012346,0.100000,7"));
    }

    #[test]
    fn first_failure_aborts() {
        let err = run(&["A.energy", "Missing.energy"]).unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound(_)));
        assert!(run(&[]).is_err());
    }
}
