mod commands;
mod terminal;

use commands::{CommandLine, Commands, run, scan, test};
use terminal::{logging, print};
use tracing::error;

#[tokio::main]
async fn main() {
    let CommandLine { command, opts } = CommandLine::parse_args();

    logging::init_logging(opts.level());
    print::banner(opts.quiet);

    let cfg = opts.to_config();
    print::settings(&cfg, opts.quiet);

    let outcome = match command.unwrap_or(Commands::Run) {
        Commands::Run => run::run(&opts, &cfg).await,
        Commands::Scan => scan::scan(&opts, &cfg).await.map(|_| ()),
        Commands::Test => test::test_saved(&opts, &cfg).await.map(|_| ()),
    };

    if let Err(e) = outcome {
        error!("{e:#}");
        std::process::exit(1);
    }

    if !opts.quiet {
        print::end_of_program();
    }
}
