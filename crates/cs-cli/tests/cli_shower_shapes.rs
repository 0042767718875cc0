use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use cs_root::testing::{BranchKind, BranchSpec, write_tree_file};

const BRANCH: &str = "_AugmentedEMBCaloClusters_shapeParameters";

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_calostat"))
}

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let p = std::env::temp_dir().join(format!("calostat_cli_{}_{}_{}", std::process::id(), nanos, name));
    std::fs::create_dir_all(&p).unwrap();
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

/// `n_good` events with a full parameter block plus one truncated event.
fn shape_file(path: &Path, n_good: usize, base: f64) {
    let mut rows: Vec<Vec<f64>> =
        (0..n_good).map(|e| (0..189).map(|i| (base + 0.01 * (e + i % 7) as f64) % 1.0).collect()).collect();
    rows.push(vec![0.5; 17]);
    let spec = BranchSpec::with_rows(BRANCH, BranchKind::StlVectorF32, rows);
    std::fs::write(path, write_tree_file("events", &[spec])).unwrap();
}

#[test]
fn eleven_page_pdf_and_json() {
    let dir = tmp_dir("shapes");
    let photon = dir.join("photon.root");
    let pion = dir.join("pion.root");
    shape_file(&photon, 12, 0.6);
    shape_file(&pion, 8, 0.2);
    let pdf = dir.join("layers.pdf");
    let json = dir.join("layers.json");

    let out = run(&[
        "shower-shapes",
        "--photon",
        photon.to_str().unwrap(),
        "--pion",
        pion.to_str().unwrap(),
        "-o",
        pdf.to_str().unwrap(),
        "--label",
        "20GeV",
        "--json",
        json.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let bytes = std::fs::read(&pdf).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(String::from_utf8_lossy(&bytes).contains("/Count 11"));

    let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    let layers = v["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 11);
    assert_eq!(layers[0]["title"], "Layer 1, 20GeV");
    assert_eq!(layers[0]["panels"][0]["photon_entries"], 12);
    assert_eq!(layers[0]["panels"][0]["pion_entries"], 8);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_branch_fails() {
    let dir = tmp_dir("nobranch");
    let photon = dir.join("photon.root");
    shape_file(&photon, 2, 0.1);
    let out = run(&[
        "shower-shapes",
        "--photon",
        photon.to_str().unwrap(),
        "--pion",
        photon.to_str().unwrap(),
        "--branch",
        "NoSuchBranch",
        "-o",
        dir.join("x.pdf").to_str().unwrap(),
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("NoSuchBranch"));
    let _ = std::fs::remove_dir_all(&dir);
}
