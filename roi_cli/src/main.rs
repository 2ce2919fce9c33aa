//! adroi - ad revenue and ROI forecasting from the command line
//!
//! # Commands
//!
//! - `predict` - Predict revenue, ROI and advice for a campaign
//! - `train` - Fit a model and save it as an artifact
//! - `estimate-cost` - Estimate the cost of an ad placement
//!
//! Results go to stdout as JSON; logs go to stderr (`ADROI_LOG`).

use clap::Parser;
use roi_cli::{init_tracing, run, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
