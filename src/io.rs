use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{MedicationQuery, ResolutionOutcome};

pub fn load_queries(path: &Path) -> Result<Vec<MedicationQuery>> {
    read_json(path)
}

pub fn load_outcomes(path: &Path) -> Result<Vec<ResolutionOutcome>> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Pretty-printed, non-ASCII kept as is. Parent directories are created.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_text(path, &json)
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("vetsearch-io-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn round_trips_outcomes_through_disk() {
        let path = scratch("nested/outcomes.json");
        let outcomes = vec![ResolutionOutcome::failure(
            MedicationQuery::new("Øjensalve", "9"),
            "Product not found on catalog",
        )];
        write_json(&path, &outcomes).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Øjensalve"));
        assert_eq!(load_outcomes(&path).unwrap(), outcomes);
    }

    #[test]
    fn loads_legacy_input() {
        let path = scratch("input.json");
        write_text(&path, r#"[{"name": "Metacam inj. 5 mg/ml", "varenr": "012345"}]"#).unwrap();
        let q = load_queries(&path).unwrap();
        assert_eq!(q, vec![MedicationQuery::new("Metacam inj. 5 mg/ml", "012345")]);
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_queries(Path::new("/nonexistent/input.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/input.json"));
    }
}
