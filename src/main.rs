use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use os_simulator::kernel::Driver;

/// Replays a program metadata script against a simulated clock,
/// producing a timestamped execution log on the monitor, a log file,
/// or both, as directed by the configuration file.
#[derive(Debug, Parser)]
struct Opts {
    /// Path to the simulator configuration file (.conf).
    config: PathBuf,

    /// Increase diagnostic verbosity (-v: debug, -vv: trace).
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let llv = match opts.verbose {
        0 => simplelog::LevelFilter::Warn,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        llv,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let mut driver = Driver::new(&opts.config).context("failed to initialize simulator")?;
    driver.start().context("simulation aborted")?;

    Ok(())
}
