//! Storefront Application CLI

use std::process;

use clap::Parser;

use crate::cli::Cli;

mod cli;

#[tokio::main]
pub async fn main() {
    storefront_app::config::load_dotenv();

    let cli = Cli::parse();

    if let Err(error) = storefront_app::observability::init_subscriber(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }

    if let Err(error) = cli.run().await {
        tracing::error!(%error, "command failed");

        process::exit(1);
    }
}
