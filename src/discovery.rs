//! Listing the candidate `.json` files of a folder.

use std::fs;
use std::path::Path;

use crate::error::{MergeError, Result};

/// Suffix of the combined files written by the categorizing merge.
pub const COMPLETE_SUFFIX: &str = "_complete.json";

/// Which immediate children of a folder count as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// `*.json`, any case, minus `_*` and `*_complete.json` (our own output).
    Records,
    /// `*.json`, any case, no exclusions.
    AllJsonIgnoreCase,
    /// `*.json` exactly, no exclusions.
    AllJson,
}

impl Filter {
    pub fn accepts(self, name: &str) -> bool {
        match self {
            Filter::AllJson => name.ends_with(".json"),
            Filter::AllJsonIgnoreCase => has_json_extension(name),
            Filter::Records => {
                has_json_extension(name)
                    && !name.starts_with('_')
                    && !name.ends_with(COMPLETE_SUFFIX)
            }
        }
    }
}

fn has_json_extension(name: &str) -> bool {
    name.len() >= 5
        && name.is_char_boundary(name.len() - 5)
        && name[name.len() - 5..].eq_ignore_ascii_case(".json")
}

/// Returns the names of the regular files directly inside `dir` that pass
/// `filter`, sorted so that every platform sees the same order.
///
/// Names that are not valid UTF-8 are skipped with a warning.
pub fn list_json_files(dir: &Path, filter: Filter) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| MergeError::io(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MergeError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| MergeError::io(entry.path(), e))?;
        let is_file = if file_type.is_symlink() {
            entry.path().is_file()
        } else {
            file_type.is_file()
        };
        if !is_file {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            log::warn!("skipping non UTF-8 file name {:?}", entry.file_name());
            continue;
        };
        if filter.accepts(&name) {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_filter_excludes_generated_output() {
        assert!(Filter::Records.accepts("longsword.json"));
        assert!(Filter::Records.accepts("Shield.JSON"));
        assert!(!Filter::Records.accepts("_weapon_complete.json"));
        assert!(!Filter::Records.accepts("weapon_complete.json"));
        assert!(!Filter::Records.accepts("_notes.json"));
        assert!(!Filter::Records.accepts("readme.txt"));
    }

    #[test]
    fn test_bare_extension_is_accepted_by_every_filter() {
        assert!(Filter::Records.accepts(".json"));
        assert!(Filter::AllJsonIgnoreCase.accepts(".JSON"));
        assert!(Filter::AllJson.accepts(".json"));
        assert!(!Filter::Records.accepts("json"));
    }

    #[test]
    fn test_case_insensitive_filter_keeps_everything_json() {
        assert!(Filter::AllJsonIgnoreCase.accepts("_weapon_complete.json"));
        assert!(Filter::AllJsonIgnoreCase.accepts("A.Json"));
        assert!(!Filter::AllJsonIgnoreCase.accepts("a.jsonl"));
    }

    #[test]
    fn test_exact_filter_is_case_sensitive() {
        assert!(Filter::AllJson.accepts("_x.json"));
        assert!(!Filter::AllJson.accepts("x.JSON"));
    }

    #[test]
    fn test_multibyte_names_do_not_panic() {
        assert!(!Filter::Records.accepts("ščř"));
        assert!(Filter::Records.accepts("meč.json"));
    }

    #[test]
    fn test_list_skips_directories_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("a.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(temp_dir.path().join("dir.json")).unwrap();

        let names = list_json_files(temp_dir.path(), Filter::Records).unwrap();
        assert_eq!(names, vec!["a.json".to_string(), "b.json".to_string()]);
    }

    #[test]
    fn test_list_missing_dir_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        let err = list_json_files(&missing, Filter::AllJson).unwrap_err();
        assert!(matches!(err, MergeError::Io { .. }));
    }
}
