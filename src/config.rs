use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::city::City;

/// Environment variable naming the manifest used when none is given.
pub const MANIFEST_ENV: &str = "BIKESHARE_MANIFEST";
pub const DEFAULT_MANIFEST: &str = "cities.json";

/// Raw export and condensed output locations for one city.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CityFiles {
    pub in_file: PathBuf,
    pub out_file: PathBuf,
}

/// Maps each city to its trip files.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "NYC": {"in_file": "data/NYC-CitiBike-2016.csv", "out_file": "data/NYC-2016-Summary.csv"},
///   "Washington": {"in_file": "data/Washington-CapitalBikeshare-2016.csv", "out_file": "data/Washington-2016-Summary.csv"}
/// }
/// ```
/// Relative paths are resolved against the manifest's directory.
#[derive(Debug)]
pub struct CityManifest {
    entries: BTreeMap<City, CityFiles>,
}

impl CityManifest {
    /// Loads the manifest from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read city manifest '{}'", path.display()))?;
        let base = path.parent().unwrap_or(Path::new(""));
        Self::from_json(&content, base)
            .with_context(|| format!("invalid city manifest '{}'", path.display()))
    }

    /// Parses a manifest, resolving relative paths against `base`.
    pub fn from_json(content: &str, base: &Path) -> Result<Self> {
        let raw: HashMap<String, CityFiles> = serde_json::from_str(content)?;

        let mut entries = BTreeMap::new();
        for (name, files) in raw {
            let city: City = name.parse()?;
            entries.insert(
                city,
                CityFiles {
                    in_file: base.join(files.in_file),
                    out_file: base.join(files.out_file),
                },
            );
        }

        Ok(Self { entries })
    }

    /// Manifest path from `BIKESHARE_MANIFEST`, falling back to `cities.json`.
    pub fn default_path() -> PathBuf {
        std::env::var(MANIFEST_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MANIFEST))
    }

    pub fn get(&self, city: City) -> Option<&CityFiles> {
        self.entries.get(&city)
    }

    /// Iterates over configured cities in NYC, Chicago, Washington order.
    pub fn iter(&self) -> impl Iterator<Item = (City, &CityFiles)> {
        self.entries.iter().map(|(city, files)| (*city, files))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "Washington": {"in_file": "Washington-CapitalBikeshare-2016.csv", "out_file": "Washington-2016-Summary.csv"},
        "nyc": {"in_file": "/abs/NYC-CitiBike-2016.csv", "out_file": "NYC-2016-Summary.csv"}
    }"#;

    #[test]
    fn test_from_json_resolves_relative_paths() {
        let manifest = CityManifest::from_json(MANIFEST, Path::new("data")).unwrap();

        let washington = manifest.get(City::Washington).unwrap();
        assert_eq!(
            washington.in_file,
            PathBuf::from("data/Washington-CapitalBikeshare-2016.csv")
        );

        let nyc = manifest.get(City::Nyc).unwrap();
        assert_eq!(nyc.in_file, PathBuf::from("/abs/NYC-CitiBike-2016.csv"));
        assert_eq!(nyc.out_file, PathBuf::from("data/NYC-2016-Summary.csv"));
        assert!(manifest.get(City::Chicago).is_none());
    }

    #[test]
    fn test_iteration_order_is_stable() {
        let manifest = CityManifest::from_json(MANIFEST, Path::new("")).unwrap();
        let cities: Vec<_> = manifest.iter().map(|(city, _)| city).collect();
        assert_eq!(cities, vec![City::Nyc, City::Washington]);
    }

    #[test]
    fn test_unknown_city_is_rejected() {
        let content = r#"{"BayArea": {"in_file": "a.csv", "out_file": "b.csv"}}"#;
        assert!(CityManifest::from_json(content, Path::new("")).is_err());
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = CityManifest::load("/nonexistent/cities.json").unwrap_err();
        assert!(err.to_string().contains("failed to read city manifest"));
    }
}
