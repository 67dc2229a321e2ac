//! market-admin - command-line front end for the marketplace console
//!
//! Runs the same controllers the console screens use: log in, page
//! through an entity list, export the visible page or submit a form.

mod cli;
mod commands;
mod logging;

use clap::Parser;

#[tokio::main]
async fn main() {
    // Load .env file
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    let _guard = match logging::init(cli.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = commands::run(cli).await {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
