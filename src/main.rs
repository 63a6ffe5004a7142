use clap::Parser;
use navwatch::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
