use std::io::{self, BufWriter};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use uncomment_gyp::cli::{parse_args, Cli};
use uncomment_gyp::{Error, Processor, RunSummary};

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to initialise logging: {err}");
    }
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let working_dir = std::env::current_dir().context("Failed to determine working directory")?;
    let options = cli.resolve_options(&working_dir)?;
    debug!("Resolved options: {options:?}");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    Processor::new(options).run(&mut out)
}

fn main() -> ExitCode {
    let cli = parse_args();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<Error>() {
                Some(typed) => eprintln!("Error: {}: {err:#}", typed.kind()),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
