//! Merge every `.json` file of a folder into one array.
//!
//! Unlike the categorizing merge this is all-or-nothing: the first file that
//! fails to parse aborts the run before anything is written.

use std::fs;
use std::path::PathBuf;

use log::info;
use serde_json::Value;

use crate::discovery::{self, Filter};
use crate::error::{MergeError, Result};
use crate::output::{self, FLAT_INDENT};
use crate::progress::{Phase, Progress, ProgressSink};

/// File name used when the caller does not pick one.
pub const DEFAULT_OUTPUT_NAME: &str = "merged.json";

#[derive(Debug, Clone)]
pub struct FlatOptions {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl FlatOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self { input: input.into(), output: output.into() }
    }

    /// Output at `<out_dir>/<name>`, appending `.json` when `name` lacks it.
    pub fn in_dir(input: impl Into<PathBuf>, out_dir: impl Into<PathBuf>, name: &str) -> Self {
        let name = if name.ends_with(".json") {
            name.to_string()
        } else {
            format!("{name}.json")
        };
        Self::new(input, out_dir.into().join(name))
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(MergeError::InvalidInput("input directory is not set".into()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(MergeError::InvalidInput("output file is not set".into()));
        }
        if self.output.file_name().is_none() {
            return Err(MergeError::InvalidInput(format!(
                "output {} has no file name",
                self.output.display()
            )));
        }
        Ok(())
    }
}

/// Returns the number of documents written to `opts.output`.
pub fn run(opts: &FlatOptions, sink: &mut dyn ProgressSink) -> Result<usize> {
    opts.validate()?;
    info!("Started - input: {:?}, output: {:?}", opts.input, opts.output);

    let names = discovery::list_json_files(&opts.input, Filter::AllJson)?;
    let total = names.len();

    let mut all_data = Vec::with_capacity(total);
    for (idx, name) in names.iter().enumerate() {
        sink.emit(Progress::new(Phase::Merge, idx + 1, total, name.as_str()));

        let path = opts.input.join(name);
        let bytes = fs::read(&path).map_err(|e| MergeError::io(&path, e))?;
        let doc: Value = serde_json::from_slice(&bytes).map_err(|e| MergeError::parse(&path, e))?;
        all_data.push(doc);
    }

    let count = all_data.len();
    output::write_pretty(&opts.output, &Value::Array(all_data), FLAT_INDENT)?;
    info!("Merged {count} file(s) into {:?}", opts.output);
    Ok(count)
}
