//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use env_logger::Env;

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    if let Err(err) = poiload_cli::run() {
        eprintln!("poiload: {err}");
        std::process::exit(1);
    }
}
