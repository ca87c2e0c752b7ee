use clap::Parser;
use fintrack::args::{Args, Command};
use fintrack::{commands, Config, Mode, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().fintrack_home().path();
    let user = args.common().user();

    // This allows for running the program without touching the ledger file. When
    // FINTRACK_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::File.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, user, init_args.name()).await?.print(),

        Command::Add(add_args) => {
            let config = load(home, user).await?;
            commands::add(config, mode, add_args.clone()).await?.print()
        }

        Command::Edit(edit_args) => {
            let config = load(home, user).await?;
            commands::edit(config, mode, edit_args.clone())
                .await?
                .print()
        }

        Command::Delete(delete_args) => {
            let config = load(home, user).await?;
            commands::delete(config, mode, delete_args.clone())
                .await?
                .print()
        }

        Command::List(list_args) => {
            let config = load(home, user).await?;
            commands::list(config, mode, list_args.clone())
                .await?
                .print()
        }

        Command::Summary(summary_args) => {
            let config = load(home, user).await?;
            commands::summary(config, mode, summary_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Loads the config for every command but `init`, with the `--user` override applied.
async fn load(home: &Path, user: Option<&str>) -> Result<Config> {
    Ok(Config::load(home).await?.with_user(user.map(str::to_string)))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
