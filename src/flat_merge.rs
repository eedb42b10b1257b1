/*
cargo run --release --bin flat_merge -- \
    --input   "PF2e_NPC creator/JSON/_equipment/weapon" \
    --out-dir "PF2e_NPC creator/JSON" \
    --name    weapons_all
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::error;
use tokio::sync::mpsc;

use equip_merge::flat::{self, FlatOptions, DEFAULT_OUTPUT_NAME};
use equip_merge::{logging, progress, Progress};

/// Merge every .json file of a folder into one JSON array.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Folder with the JSON files to merge
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Folder the merged file is written to
    #[arg(short, long = "out-dir", value_name = "PATH")]
    out_dir: PathBuf,

    /// Name of the merged file (".json" is appended when missing)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_NAME)]
    name: String,

    /// Directory for run logs
    #[arg(long, value_name = "PATH", default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_dir, "flat_merge")?;

    let opts = FlatOptions::in_dir(&cli.input, &cli.out_dir, &cli.name);
    opts.validate()?;
    let output = opts.output.clone();

    let (tx, rx) = mpsc::unbounded_channel::<Progress>();
    let worker = tokio::task::spawn_blocking(move || {
        let mut tx = tx;
        flat::run(&opts, &mut tx)
    });
    let bar = progress::render(rx).await;

    match worker.await.context("worker thread panicked")? {
        Ok(count) => {
            bar.finish_with_message("done");
            println!("Merged {} file(s) into {}", count, output.display());
            Ok(())
        }
        Err(e) => {
            bar.abandon_with_message("failed");
            error!("Merge failed: {e}");
            Err(e).context("flat merge failed")
        }
    }
}
