use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::Parser;
use log::error;
use psd_strip::{config::DEFAULT_OUTPUT_DIR, ExportOptions};

/// Turn the layers of a PSD file into the frames of a vertical-strip animation, baking the frame
/// count into the output file name
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// The layered document to convert
    source: PathBuf,

    /// Directory to write the strip into
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Create the output directory if it doesn't exist
    #[arg(long)]
    create_output_dir: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    let options = ExportOptions {
        output_dir: args.output_dir,
        create_output_dir: args.create_output_dir,
    };
    match psd_strip::export(&args.source, &options) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            // Print the whole chain, since the `source`s hold the actual I/O or decoding problem
            let mut msg = format!("Failed to export {:?}: {}", args.source, e);
            let mut source = e.source();
            while let Some(cause) = source {
                msg.push_str(&format!(": {}", cause));
                source = cause.source();
            }
            error!("{}", msg);
            ExitCode::FAILURE
        }
    }
}
