//! Input file discovery by wildcard pattern.

use std::fs;
use std::path::Path;

use cs_core::{Error, Result};
use regex::Regex;

use crate::scan::ScanInput;
use crate::truth::truth_energy_from_name;

/// Anchored regex for a shell-style wildcard: `*` matches any run of
/// characters, `?` exactly one; everything else is literal.
pub fn wildcard_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    let mut literal = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(c.encode_utf8(&mut literal))),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| Error::Validation(format!("invalid pattern '{pattern}': {e}")))
}

/// Files directly inside `dir` whose names match `pattern`, ordered by truth
/// energy (ties by name).
///
/// Fails when nothing matches or when a matching name carries no truth energy.
pub fn discover_inputs(dir: &Path, pattern: &str) -> Result<Vec<ScanInput>> {
    let re = wildcard_regex(pattern)?;
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(name) = path.file_name().and_then(|s| s.to_str())
            && re.is_match(name)
        {
            let truth_gev = truth_energy_from_name(name)?;
            found.push(ScanInput { path, truth_gev });
        }
    }
    if found.is_empty() {
        return Err(Error::NoInputFiles { dir: dir.display().to_string(), pattern: pattern.to_string() });
    }
    found.sort_by(|a, b| a.truth_gev.total_cmp(&b.truth_gev).then_with(|| a.path.cmp(&b.path)));
    log::debug!("{} input files match '{pattern}' in {}", found.len(), dir.display());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn tmp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        let p = std::env::temp_dir().join(format!("cs-calo-{name}-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&p).unwrap();
        p
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn wildcard_semantics() {
        let re = wildcard_regex("ALLEGRO_*GeV_photon.root").unwrap();
        assert!(re.is_match("ALLEGRO_10GeV_photon.root"));
        assert!(re.is_match("ALLEGRO_GeV_photon.root"));
        assert!(!re.is_match("ALLEGRO_10GeV_photonXroot"));
        assert!(!re.is_match("xALLEGRO_10GeV_photon.root"));

        let re = wildcard_regex("run?.root").unwrap();
        assert!(re.is_match("run1.root"));
        assert!(!re.is_match("run12.root"));
    }

    #[test]
    fn sorted_by_truth_energy() {
        let dir = tmp_dir("sort");
        for name in ["s_100GeV_a.root", "s_5GeV_a.root", "s_20GeV_a.root", "s_20GeV_b.txt"] {
            touch(&dir, name);
        }
        std::fs::create_dir_all(dir.join("s_1GeV_a.root")).unwrap();

        let found = discover_inputs(&dir, "s_*GeV_*.root").unwrap();
        let truths: Vec<f64> = found.iter().map(|i| i.truth_gev).collect();
        assert_eq!(truths, vec![5.0, 20.0, 100.0]);
        assert!(found[0].path.ends_with("s_5GeV_a.root"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_match_is_an_error() {
        let dir = tmp_dir("empty");
        touch(&dir, "other.root");
        let err = discover_inputs(&dir, "*GeV*.root").unwrap_err();
        assert!(matches!(err, Error::NoInputFiles { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unparseable_match_is_an_error() {
        let dir = tmp_dir("bad");
        touch(&dir, "events_10GeV.root");
        touch(&dir, "events_misc.root");
        let err = discover_inputs(&dir, "events_*.root").unwrap_err();
        assert!(matches!(err, Error::TruthEnergy(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
