//! @acp:module "Directory Scan"
//! @acp:summary "Finds .stan/.data.json pairs, files and subdirectories"
//! @acp:domain pages
//! @acp:layer service

use std::fs;
use std::path::Path;

use glob::Pattern;
use serde::Serialize;

use crate::config::PagesConfig;
use crate::error::Result;

/// Name of the generated file; never listed in its own directory
pub const INDEX_FILE: &str = "index.md";

const STAN_EXT: &str = ".stan";
const DATA_EXT: &str = ".data.json";

/// A Stan program and its matching data file, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StanPair {
    /// File name of the `.stan` program
    pub stan: String,
    /// File name of `<stem>.data.json` when it exists next to the program
    pub data: Option<String>,
}

impl StanPair {
    /// Program name without the `.stan` extension
    pub fn stem(&self) -> &str {
        self.stan.strip_suffix(STAN_EXT).unwrap_or(&self.stan)
    }
}

/// @acp:summary "Find all .stan files in a directory and their data files"
pub fn find_stan_pairs(dir: &Path) -> Result<Vec<StanPair>> {
    let pattern = format!(
        "{}/*{}",
        Pattern::escape(&dir.to_string_lossy()),
        STAN_EXT
    );

    let mut pairs: Vec<StanPair> = glob::glob(&pattern)
        .map_err(|e| crate::CaseStudyError::invalid(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let stan = path.file_name()?.to_string_lossy().to_string();
            let stem = stan.strip_suffix(STAN_EXT)?.to_string();
            let data_name = format!("{}{}", stem, DATA_EXT);
            let data = dir.join(&data_name).exists().then_some(data_name);
            Some(StanPair { stan, data })
        })
        .collect();

    pairs.sort_by(|a, b| a.stan.cmp(&b.stan));
    Ok(pairs)
}

/// @acp:summary "Check a directory tree for any .stan programs"
/// Skipped directories are not descended into.
pub fn has_stan_pairs_recursive(dir: &Path, config: &PagesConfig) -> bool {
    if find_stan_pairs(dir).map(|p| !p.is_empty()).unwrap_or(false) {
        return true;
    }

    match list_subdirs(dir, config) {
        Ok(subdirs) => subdirs
            .iter()
            .any(|name| has_stan_pairs_recursive(&dir.join(name), config)),
        Err(e) => {
            tracing::warn!("Cannot read {}: {}", dir.display(), e);
            false
        }
    }
}

/// Regular files in `dir` except the index itself, sorted by name
pub fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name != INDEX_FILE {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

/// Non-skipped subdirectory names of `dir`, sorted
pub fn list_subdirs(dir: &Path, config: &PagesConfig) -> Result<Vec<String>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !config.is_skipped(&name) {
            dirs.push(name);
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn test_pairs_with_and_without_data() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "radon.stan");
        touch(tmp.path(), "radon.data.json");
        touch(tmp.path(), "bym2.stan");
        touch(tmp.path(), "notes.txt");

        let pairs = find_stan_pairs(tmp.path()).unwrap();
        assert_eq!(
            pairs,
            vec![
                StanPair { stan: "bym2.stan".into(), data: None },
                StanPair {
                    stan: "radon.stan".into(),
                    data: Some("radon.data.json".into())
                },
            ]
        );
        assert_eq!(pairs[1].stem(), "radon");
    }

    #[test]
    fn test_orphan_data_file_is_not_a_pair() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "only.data.json");
        assert!(find_stan_pairs(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_glob_metacharacters_in_path() {
        let tmp = tempfile::tempdir().unwrap();
        let odd = tmp.path().join("models [v2]");
        fs::create_dir(&odd).unwrap();
        touch(&odd, "m.stan");
        assert_eq!(find_stan_pairs(&odd).unwrap().len(), 1);
    }

    #[test]
    fn test_recursive_detection_skips_hidden() {
        let tmp = tempfile::tempdir().unwrap();
        let config = PagesConfig::default();
        fs::create_dir_all(tmp.path().join(".cache/deep")).unwrap();
        touch(&tmp.path().join(".cache/deep"), "hidden.stan");
        assert!(!has_stan_pairs_recursive(tmp.path(), &config));

        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        touch(&tmp.path().join("a/b"), "found.stan");
        assert!(has_stan_pairs_recursive(tmp.path(), &config));
    }

    #[test]
    fn test_list_files_excludes_index() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), INDEX_FILE);
        touch(tmp.path(), "b.py");
        touch(tmp.path(), ".nojekyll");
        fs::create_dir(tmp.path().join("sub")).unwrap();

        assert_eq!(list_files(tmp.path()).unwrap(), vec![".nojekyll", "b.py"]);
    }
}
