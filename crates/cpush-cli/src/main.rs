use cpush_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse_args();

    // Initialize logging as early as possible; fall back to stderr only.
    if let Err(err) = logging::init_logging(cli.log_dir.as_deref()) {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    match cli.run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("cpush error: {:#}", err);
            std::process::exit(2);
        }
    }
}
