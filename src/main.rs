use clap::Parser;
use alphamind::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    env_logger::Builder::new()
        .filter(None, log::LevelFilter::Warn)
        .filter(Some("alphamind"), log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    run(Cli::parse())
}
