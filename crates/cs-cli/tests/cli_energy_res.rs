use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use cs_root::testing::{BranchKind, BranchSpec, write_tree_file};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

const PATTERN: &str = "ALLEGRO_RECO_1000evt_*GeV_photon_stripseverywhere_LAr_Pb.root";

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

fn energy_file(dir: &Path, truth: u32, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Normal::new(-0.01, 0.04).unwrap();
    let rows: Vec<Vec<f64>> = (0..2000)
        .map(|i| if i % 20 == 0 { vec![] } else { vec![f64::from(truth) * (1.0 + dist.sample(&mut rng)), 0.2] })
        .collect();
    let specs: Vec<BranchSpec> = ["AugmentedEMBCaloClusters", "AugmentedEMBCaloTopoClusters"]
        .iter()
        .map(|parent| {
            BranchSpec::with_rows(
                &format!("{parent}.energy"),
                BranchKind::SplitMember { parent: parent.to_string() },
                rows.clone(),
            )
        })
        .collect();
    let name = format!("ALLEGRO_RECO_1000evt_{truth}GeV_photon_stripseverywhere_LAr_Pb.root");
    std::fs::write(dir.join(name), write_tree_file("events", &specs)).unwrap();
}

#[test]
fn missing_input_directory_is_usage_error() {
    let out = run(&["energy-res"]);
    assert_eq!(out.status.code(), Some(2), "stderr={}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stderr).contains("input directory"));
}

#[test]
fn empty_directory_fails() {
    let dir = tmp_dir("empty");
    let csv = dir.join("out.csv");
    let out = run(&["energy-res", dir.to_str().unwrap(), "-o", csv.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("No input files matched"), "stderr={stderr}");
    assert!(!csv.exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn flag_directory_wins_over_positional() {
    let dir = tmp_dir("flag");
    energy_file(&dir, 20, 7);
    energy_file(&dir, 60, 8);
    let missing = dir.join("does-not-exist");
    let csv = dir.join("perf.csv");
    let fig = dir.join("perf.svg");
    let json = dir.join("perf.json");

    let out = run(&[
        "--log-level",
        "warn",
        "energy-res",
        missing.to_str().unwrap(),
        "--indir",
        dir.to_str().unwrap(),
        "-o",
        csv.to_str().unwrap(),
        "-p",
        fig.to_str().unwrap(),
        "-P",
        PATTERN,
        "--json",
        json.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let text = std::fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "ClusterType,E_truth_GeV,response_mean,resolution_sigma_over_E,NeventsPass");
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("AugmentedEMBCaloClusters.energy,20,"));
    assert!(lines[2].starts_with("AugmentedEMBCaloClusters.energy,60,"));
    assert!(lines[3].starts_with("AugmentedEMBCaloTopoClusters.energy,20,"));
    assert!(lines[1].ends_with(",1900"));

    let mean: f64 = lines[1].split(',').nth(2).unwrap().parse().unwrap();
    assert!((mean + 0.01).abs() < 0.01, "mean={mean}");

    assert!(std::fs::read_to_string(&fig).unwrap().contains("Energy resolution"));
    let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(v["series"].as_array().unwrap().len(), 2);
    let _ = std::fs::remove_dir_all(&dir);
}
