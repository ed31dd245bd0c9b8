use albrouter::cli::{run_cli, Cli};
use albrouter::logging::{init_logging, LogConfig};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_cli(cli, &mut out)
}
