use clap::Parser;
use folio::cli::{Args, CliError, build_config, init_logging};
use folio::commands;
use tracing::error;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(config) = build_config(&args) else {
        std::process::exit(1);
    };

    let session = match config.connect() {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Failed to set up client");
            std::process::exit(1);
        }
    };
    session.restore_from_storage();

    if let Err(e) = commands::run(&args.command, &config, &session).await {
        if let CliError::Api(api_error) = &e {
            session.handle_api_error(api_error);
        }
        error!(error = %e, "Command failed");
        std::process::exit(1);
    }

    // Pick up a token refreshed during the command, or drop an expired one.
    session.refresh_if_needed();
}
