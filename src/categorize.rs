//! Sort a folder of equipment records into per-category folders.
//!
//! A run has two phases. The scan phase reads every candidate file, keeps the
//! ones that parse and tallies the ones that don't. The write phase creates
//! `<dest>/<category>/`, copies the member files there byte-for-byte and
//! writes `<dest>/_<prefix><category>_complete.json` holding every member
//! keyed by its record id.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::{Map, Value};

use crate::discovery::{self, Filter, COMPLETE_SUFFIX};
use crate::error::{MergeError, Result};
use crate::output::{self, COMBINED_INDENT};
use crate::progress::{Phase, Progress, ProgressSink};
use crate::record::{self, category_of, record_key};

#[derive(Debug, Clone)]
pub struct CategorizeOptions {
    pub source: PathBuf,
    pub dest: PathBuf,
    /// Inserted between the leading `_` and the category in combined file
    /// names, e.g. `equipment_` gives `_equipment_weapon_complete.json`.
    pub prefix: String,
    /// Skip `_*` and `*_complete.json` so earlier output is never re-read.
    pub exclude_generated: bool,
    /// The caller confirmed that source and destination may be the same.
    pub allow_same_dir: bool,
}

impl CategorizeOptions {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            prefix: String::new(),
            exclude_generated: true,
            allow_same_dir: false,
        }
    }

    pub fn combined_file_name(&self, category: &str) -> String {
        format!("_{}{}{}", self.prefix, category, COMPLETE_SUFFIX)
    }

    /// True when both paths name the same directory.
    pub fn same_dir(&self) -> bool {
        same_dir(&self.source, &self.dest)
    }

    /// Rejects unusable input before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.source.as_os_str().is_empty() {
            return Err(MergeError::InvalidInput("source directory is not set".into()));
        }
        if self.dest.as_os_str().is_empty() {
            return Err(MergeError::InvalidInput("destination directory is not set".into()));
        }
        if !self.source.is_dir() {
            return Err(MergeError::InvalidInput(format!(
                "source {} is not a directory",
                self.source.display()
            )));
        }
        if self.same_dir() && !self.allow_same_dir {
            return Err(MergeError::SameDirectory(self.source.clone()));
        }
        Ok(())
    }

    fn filter(&self) -> Filter {
        if self.exclude_generated {
            Filter::Records
        } else {
            Filter::AllJsonIgnoreCase
        }
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Copying a file onto itself truncates it, which happens when the source
/// folder is one of the category folders inside the destination.
fn is_same_file(a: &Path, b: &Path) -> bool {
    matches!(
        (fs::canonicalize(a), fs::canonicalize(b)),
        (Ok(a), Ok(b)) if a == b
    )
}

/// A file that was left out of every output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub name: String,
    /// Files copied into the category folder.
    pub files: usize,
    /// Entries in the combined document; lower than `files` on id clashes.
    pub keys: usize,
    pub combined: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizeReport {
    /// Candidate files found in the source folder.
    pub total_files: usize,
    /// Files parsed, copied and merged.
    pub processed: usize,
    pub categories: Vec<CategorySummary>,
    pub failures: Vec<FailedFile>,
}

impl CategorizeReport {
    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn error_count(&self) -> usize {
        self.failures.len()
    }
}

type Groups = BTreeMap<String, Vec<(String, Value)>>;

/// Runs the whole batch. Bad files are tallied in the report; filesystem
/// failures abort the run and keep whatever was already written.
pub fn run(opts: &CategorizeOptions, sink: &mut dyn ProgressSink) -> Result<CategorizeReport> {
    opts.validate()?;
    info!(
        "Started - source: {:?}, dest: {:?}, prefix: {:?}, exclude_generated: {}",
        opts.source, opts.dest, opts.prefix, opts.exclude_generated
    );

    let names = discovery::list_json_files(&opts.source, opts.filter())?;
    let mut report = CategorizeReport {
        total_files: names.len(),
        ..Default::default()
    };
    if names.is_empty() {
        info!("No JSON files in {:?}, nothing to do", opts.source);
        return Ok(report);
    }

    let groups = scan(&opts.source, &names, &mut report, sink)?;
    report.processed = groups.values().map(Vec::len).sum();
    write_groups(opts, groups, &mut report, sink)?;

    info!(
        "Finished - {} files, {} processed, {} categories, {} errors",
        report.total_files,
        report.processed,
        report.category_count(),
        report.error_count()
    );
    Ok(report)
}

// ----- phase 1: read and classify -------------------------------------------
fn scan(
    source: &Path,
    names: &[String],
    report: &mut CategorizeReport,
    sink: &mut dyn ProgressSink,
) -> Result<Groups> {
    let total = names.len();
    let mut groups = Groups::new();

    for (idx, name) in names.iter().enumerate() {
        sink.emit(Progress::new(Phase::Scan, idx + 1, total, name.as_str()));

        let path = source.join(name);
        let bytes = fs::read(&path).map_err(|e| MergeError::io(&path, e))?;

        match classify(&bytes) {
            Ok((category, doc)) => groups.entry(category).or_default().push((name.clone(), doc)),
            Err(reason) => {
                warn!("{name}: {reason}");
                report.failures.push(FailedFile { name: name.clone(), reason });
            }
        }
    }

    Ok(groups)
}

fn classify(bytes: &[u8]) -> std::result::Result<(String, Value), String> {
    let doc: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    if !doc.is_object() {
        return Err("top-level JSON is not an object".into());
    }

    let category = category_of(&doc);
    if !record::is_safe_folder_name(category) {
        return Err(format!("category {category:?} cannot be used as a folder name"));
    }
    Ok((category.to_string(), doc))
}

// ----- phase 2: folders, copies, combined documents -------------------------
fn write_groups(
    opts: &CategorizeOptions,
    groups: Groups,
    report: &mut CategorizeReport,
    sink: &mut dyn ProgressSink,
) -> Result<()> {
    let total = groups.len();

    for (idx, (category, members)) in groups.into_iter().enumerate() {
        sink.emit(Progress::new(Phase::Materialize, idx + 1, total, category.as_str()));

        let folder = opts.dest.join(&category);
        fs::create_dir_all(&folder).map_err(|e| MergeError::io(&folder, e))?;

        let files = members.len();
        let mut combined = Map::new();
        for (name, doc) in members {
            let from = opts.source.join(&name);
            let to = folder.join(&name);
            if is_same_file(&from, &to) {
                info!("{category}: {name} already sits in {:?}, not copied", folder);
            } else {
                fs::copy(&from, &to).map_err(|e| MergeError::io(&from, e))?;
            }

            let key = record_key(&doc, &name);
            if combined.insert(key.clone(), doc).is_some() {
                warn!("{category}: duplicate key {key:?}, {name} replaces the earlier record");
            }
        }

        let keys = combined.len();
        let combined_path = opts.dest.join(opts.combined_file_name(&category));
        output::write_pretty(&combined_path, &Value::Object(combined), COMBINED_INDENT)?;
        info!("{category}: {files} files copied, {keys} records in {:?}", combined_path);

        report.categories.push(CategorySummary {
            name: category,
            files,
            keys,
            combined: combined_path,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Silent;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_combined_file_name() {
        let mut opts = CategorizeOptions::new("src", "dst");
        assert_eq!(opts.combined_file_name("weapon"), "_weapon_complete.json");
        opts.prefix = "equipment_".into();
        assert_eq!(opts.combined_file_name("weapon"), "_equipment_weapon_complete.json");
    }

    #[test]
    fn test_validate_rejects_missing_paths() {
        let opts = CategorizeOptions::new("", "dst");
        assert!(matches!(opts.validate(), Err(MergeError::InvalidInput(_))));

        let temp_dir = TempDir::new().unwrap();
        let opts = CategorizeOptions::new(temp_dir.path(), "");
        assert!(matches!(opts.validate(), Err(MergeError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_same_dir_needs_confirmation() {
        let temp_dir = TempDir::new().unwrap();
        let mut opts = CategorizeOptions::new(temp_dir.path(), temp_dir.path().join("."));
        assert!(opts.same_dir());
        assert!(matches!(opts.validate(), Err(MergeError::SameDirectory(_))));

        opts.allow_same_dir = true;
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_classify() {
        let (cat, _) = classify(br#"{"system":{"category":"armor"}}"#).unwrap();
        assert_eq!(cat, "armor");

        let (cat, _) = classify(br#"{"name":"Rope"}"#).unwrap();
        assert_eq!(cat, "_other");

        assert!(classify(b"{not json").is_err());
        assert!(classify(b"[1, 2]").is_err());
        assert!(classify(br#"{"system":{"category":"../escape"}}"#).is_err());
    }

    #[test]
    fn test_example_layout() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write(src.path(), "a.json", r#"{"_id":"x1","system":{"category":"weapon"}}"#);
        write(src.path(), "b.json", r#"{"_id":"x2","system":{"category":"weapon"}}"#);
        write(src.path(), "c.json", r#"{"system":{}}"#);

        let opts = CategorizeOptions::new(src.path(), dst.path());
        let report = run(&opts, &mut Silent).unwrap();

        assert_eq!(report.total_files, 3);
        assert_eq!(report.processed, 3);
        assert_eq!(report.category_count(), 2);
        assert_eq!(report.error_count(), 0);

        assert!(dst.path().join("weapon/a.json").is_file());
        assert!(dst.path().join("weapon/b.json").is_file());
        assert!(dst.path().join("_other/c.json").is_file());

        assert_eq!(
            read_json(&dst.path().join("_weapon_complete.json")),
            json!({
                "x1": {"_id": "x1", "system": {"category": "weapon"}},
                "x2": {"_id": "x2", "system": {"category": "weapon"}}
            })
        );
        assert_eq!(
            read_json(&dst.path().join("__other_complete.json")),
            json!({"c.json": {"system": {}}})
        );
    }

    #[test]
    fn test_progress_events_cover_both_phases() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write(src.path(), "a.json", r#"{"system":{"category":"weapon"}}"#);
        write(src.path(), "b.json", r#"{"system":{"category":"armor"}}"#);

        let mut events = Vec::new();
        let opts = CategorizeOptions::new(src.path(), dst.path());
        run(&opts, &mut |p: Progress| events.push(p)).unwrap();

        assert_eq!(
            events,
            vec![
                Progress::new(Phase::Scan, 1, 2, "a.json"),
                Progress::new(Phase::Scan, 2, 2, "b.json"),
                Progress::new(Phase::Materialize, 1, 2, "armor"),
                Progress::new(Phase::Materialize, 2, 2, "weapon"),
            ]
        );
    }

    #[test]
    fn test_empty_source_creates_nothing() {
        let src = TempDir::new().unwrap();
        let parent = TempDir::new().unwrap();
        let dst = parent.path().join("out");
        write(src.path(), "notes.txt", "not json");

        let opts = CategorizeOptions::new(src.path(), &dst);
        let report = run(&opts, &mut Silent).unwrap();

        assert!(report.is_empty());
        assert!(!dst.exists());
    }

    #[test]
    fn test_missing_source_is_rejected() {
        let parent = TempDir::new().unwrap();
        let opts = CategorizeOptions::new(parent.path().join("gone"), parent.path());
        assert!(matches!(run(&opts, &mut Silent), Err(MergeError::InvalidInput(_))));
    }
}
