//! Pretty JSON writers with a fixed indent.
//!
//! serde_json writes non-ASCII characters literally, so names like
//! "Meč" survive as-is instead of becoming `\u` escapes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::{MergeError, Result};

/// Indent used for per-category combined documents.
pub const COMBINED_INDENT: &[u8] = b"    ";
/// Indent used for the flat merge array.
pub const FLAT_INDENT: &[u8] = b"  ";

/// Writes `value` to `path`, replacing any existing file.
pub fn write_pretty(path: &Path, value: &Value, indent: &[u8]) -> Result<()> {
    let file = File::create(path).map_err(|e| MergeError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(indent));
    // a Value always serializes, so any failure here is the writer's
    value
        .serialize(&mut ser)
        .map_err(|e| MergeError::io(path, e.into()))?;
    writer.flush().map_err(|e| MergeError::io(path, e))?;
    Ok(())
}
