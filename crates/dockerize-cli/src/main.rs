mod commands;

use clap::{ArgAction, Parser};
use dockerize::Verbosity;
use std::io::IsTerminal;
use std::process::ExitCode;

use commands::BuildArgs;

#[derive(Parser)]
#[command(name = "dockerize", about = "Containerize an npm package with docker")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    build: BuildArgs,

    /// More output (-v debug, -vv also streams docker output)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// `LOG_LEVEL` wins over the flags when it names a known level.
    fn verbosity(&self) -> Verbosity {
        std::env::var_os("LOG_LEVEL")
            .and_then(|level| level.to_str().and_then(Verbosity::from_log_level))
            // arch-lint: allow(no-silent-result-drop) reason="Option default; unset or unknown LOG_LEVEL falls back to the flags"
            .unwrap_or_else(|| Verbosity::from_flags(self.verbose, self.quiet))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // arch-lint: allow(no-silent-result-drop) reason="RUST_LOG unset or unparsable; the verbosity directive applies instead"
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.filter_directive())),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();

    match commands::build(cli.build, verbosity).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            if verbosity.shows_error_chain() {
                for cause in err.chain().skip(1) {
                    tracing::error!("  caused by: {cause}");
                }
            }
            ExitCode::FAILURE
        }
    }
}
