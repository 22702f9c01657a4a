use std::process;

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("FIELDMAP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_logging();
    let cli = fieldmap::cli::Cli::parse_args();
    if let Err(e) = fieldmap::cli::run(&cli) {
        eprintln!("{}", e.pretty_print());
        process::exit(e.exit_code());
    }
}
