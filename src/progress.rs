//! Progress events emitted by the batch pipelines.
//!
//! The worker only ever writes events; whoever renders them (a terminal bar,
//! a test collecting into a `Vec`) only ever reads them.

use std::fmt;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Stage of a run the event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reading and classifying source files.
    Scan,
    /// Creating category folders, copying files and writing combined output.
    Materialize,
    /// Appending documents for the flat merge.
    Merge,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Scan => "scan",
            Phase::Materialize => "write",
            Phase::Merge => "merge",
        };
        f.write_str(label)
    }
}

/// One step of a run. `current` is 1-based and never exceeds `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub phase: Phase,
    pub current: usize,
    pub total: usize,
    pub name: String,
}

impl Progress {
    pub fn new(phase: Phase, current: usize, total: usize, name: impl Into<String>) -> Self {
        Self { phase, current, total, name: name.into() }
    }
}

pub trait ProgressSink {
    fn emit(&mut self, event: Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(Progress),
{
    fn emit(&mut self, event: Progress) {
        self(event)
    }
}

/// Forwards events to a rendering loop. A closed receiver is ignored so the
/// batch still runs to completion when nobody is watching.
impl ProgressSink for UnboundedSender<Progress> {
    fn emit(&mut self, event: Progress) {
        let _ = self.send(event);
    }
}

/// Discards every event.
pub struct Silent;

impl ProgressSink for Silent {
    fn emit(&mut self, _event: Progress) {}
}

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Draws events from `rx` on a terminal bar until every sender is gone.
/// The bar restarts at zero whenever the phase changes.
pub async fn render(mut rx: UnboundedReceiver<Progress>) -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut phase = None;
    while let Some(event) = rx.recv().await {
        if phase != Some(event.phase) {
            phase = Some(event.phase);
            bar.set_length(event.total as u64);
            bar.set_position(0);
        }
        bar.set_position(event.current as u64);
        bar.set_message(format!("{} {}", event.phase, event.name));
    }
    bar
}
