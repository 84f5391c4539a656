mod app;
mod charts;
mod color;
mod config;
mod data;
mod error;
mod report;

use std::process::ExitCode;

use app::Explorer;
use config::Config;

fn main() -> ExitCode {
    env_logger::init();

    match Explorer::new(Config::default()).run() {
        Ok(summary) => {
            log::info!(
                "Explored {} rows x {} columns, wrote {} charts",
                summary.rows,
                summary.columns,
                summary.charts.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
