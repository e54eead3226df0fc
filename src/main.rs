use clap::Parser;
use simple_todo::cli::{self, Cli};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = cli::run(&cli, &mut stdout) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
