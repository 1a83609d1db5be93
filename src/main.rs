use clap::Parser;
use tracing_subscriber::EnvFilter;

use fops::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("fops=debug,info")
    } else {
        EnvFilter::new("fops=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Screen(args) => {
            cli::screen::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Generate(args) => {
            cli::generate::run(args, cli.verbose)?;
        }
        cli::Commands::Score(args) => {
            cli::score::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Patterns(args) => {
            cli::patterns::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Expand(args) => {
            cli::expand::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Verify(args) => {
            cli::verify::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
