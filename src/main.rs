mod app;
mod board;
mod cli;
mod club;
mod color;
mod config;
mod constants;
mod domain;
mod layout;
mod logging;
mod storage;

use clap::Parser;

use crate::{
    cli::Cli,
    config::Settings,
    logging::{LogTarget, init_logging},
};

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::resolve(cli.data_dir, cli.api_url, cli.timeout, cli.ephemeral) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(command) => {
            init_logging(LogTarget::Stderr, &storage::get_state_dir());
            if let Err(e) = cli::run_command(command, &settings) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            init_logging(LogTarget::File, &storage::get_state_dir());
            if let Err(e) = app::run_ui(&settings) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
