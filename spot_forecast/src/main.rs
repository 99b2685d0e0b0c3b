use clap::Parser;
use spot_forecast::{missing_input, missing_input_message, run, Cli, DEFAULT_LOG_FILTER};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        if let Some(path) = missing_input(&err) {
            eprintln!("{}", missing_input_message(&path));
            std::process::exit(1);
        }
        return Err(err);
    }

    Ok(())
}
