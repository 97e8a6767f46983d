use clap::Parser;
use magic_brush::{cli, logger};

fn main() -> std::process::ExitCode {
    // Session log (overwrites previous run's log)
    logger::init();

    let args = cli::CliArgs::parse();
    cli::run(args)
}
