use clap::Parser;
use skypost::cli::Config;
use std::process;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    env_logger::Builder::new()
        .filter_level(config.verbosity().log_level_filter())
        .init();

    if let Err(err) = skypost::cli::run(config).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
