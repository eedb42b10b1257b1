/*
cargo run --release --bin category_merge -- \
    --source "PF2e_NPC creator/JSON/_equipment" \
    --dest   "PF2e_NPC creator/JSON/_equipment/sorted" \
    --prefix equipment_

cargo run --release --bin category_merge -- \
    --source "PF2e_NPC creator/JSON" \
    --dest   "PF2e_NPC creator/JSON" \
    --allow-same-dir
*/

use std::{
    io::{self, BufRead, IsTerminal, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::error;
use tokio::sync::mpsc;

use equip_merge::categorize::{self, CategorizeOptions};
use equip_merge::{logging, progress, Progress};

/// Sort equipment JSON files into category folders and write one combined file per category.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Folder that holds the individual record files
    #[arg(short, long, value_name = "PATH")]
    source: PathBuf,

    /// Folder where category folders and combined files are created
    #[arg(short, long, value_name = "PATH")]
    dest: PathBuf,

    /// Text placed between "_" and the category in combined file names
    #[arg(long, default_value = "")]
    prefix: String,

    /// Also read "_*" and "*_complete.json" files (earlier output)
    #[arg(long)]
    include_underscored: bool,

    /// Do not ask when source and destination are the same folder
    #[arg(long)]
    allow_same_dir: bool,

    /// Directory for run logs
    #[arg(long, value_name = "PATH", default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    // ----- parse CLI --------------------------------------------------------
    let cli = Cli::parse();

    // ----- initialise logging ----------------------------------------------
    let log_path = logging::init(&cli.log_dir, "category_merge")?;

    let mut opts = CategorizeOptions::new(&cli.source, &cli.dest);
    opts.prefix = cli.prefix;
    opts.exclude_generated = !cli.include_underscored;
    opts.allow_same_dir = cli.allow_same_dir;

    if opts.same_dir() && !opts.allow_same_dir {
        if !confirm_same_dir(&opts.source)? {
            println!("Aborted, nothing was written.");
            return Ok(());
        }
        opts.allow_same_dir = true;
    }
    opts.validate()?;

    // ----- run the batch on a worker, draw progress here -------------------
    let (tx, rx) = mpsc::unbounded_channel::<Progress>();
    let worker = tokio::task::spawn_blocking(move || {
        let mut tx = tx;
        categorize::run(&opts, &mut tx)
    });
    let bar = progress::render(rx).await;

    let report = match worker.await.context("worker thread panicked")? {
        Ok(report) => report,
        Err(e) => {
            bar.abandon_with_message("critical error");
            error!("Critical error: {e}");
            return Err(e).context("categorizing merge failed, files written so far are kept");
        }
    };

    if report.is_empty() {
        bar.finish_and_clear();
        println!("No relevant .json files found in {}", cli.source.display());
        return Ok(());
    }
    bar.finish_with_message("done");

    // ----- summary ----------------------------------------------------------
    for failed in &report.failures {
        eprintln!("  skipped {}: {}", failed.name, failed.reason);
    }
    println!(
        "Done! Processed {} files into {} categories. Errors: {}.",
        report.total_files,
        report.category_count(),
        report.error_count()
    );
    println!("Log written to {}", log_path.display());
    Ok(())
}

/// Asks on stdin before writing next to the original data. Without a
/// terminal there is nobody to ask, so the run is refused.
fn confirm_same_dir(dir: &Path) -> Result<bool> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        bail!(
            "source and destination are both {}; pass --allow-same-dir to confirm",
            dir.display()
        );
    }

    print!(
        "Source and destination are the same folder ({}).\n\
         Category folders and combined files will sit next to the original data.\n\
         Continue? [y/N] ",
        dir.display()
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}
