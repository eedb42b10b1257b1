//! Sort equipment JSON records into per-category folders and merge them.
//!
//! Two batch pipelines live here:
//! * [`categorize::run`] groups a folder of records by `system.category`,
//!   copies every record into `<dest>/<category>/` and writes one combined
//!   object per category.
//! * [`flat::run`] merges every `.json` file of a folder into one array.
//!
//! Both report progress through a [`progress::ProgressSink`] so the batch
//! never touches the display directly.

pub mod categorize;
pub mod discovery;
pub mod error;
pub mod flat;
pub mod logging;
pub mod output;
pub mod progress;
pub mod record;

pub use categorize::{CategorizeOptions, CategorizeReport};
pub use error::{MergeError, Result};
pub use flat::FlatOptions;
pub use progress::{Phase, Progress, ProgressSink};
