use clap::{Parser, Subcommand};
use storefront_app::config::LoggingConfig;

mod checkout;
mod db;
mod input;
mod orders;
mod output;
mod payouts;
mod quote;
mod reconcile;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    /// Logging output settings.
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db(db::DbCommand),

    /// Price an order without placing it
    Quote(quote::QuoteArgs),

    /// Compare a client cart with the live catalog
    Reconcile(reconcile::ReconcileArgs),

    /// Price and place an order
    Checkout(checkout::CheckoutArgs),

    /// Order maintenance
    Orders(orders::OrdersCommand),

    /// Vendor payouts
    Payouts(payouts::PayoutsCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Quote(args) => quote::run(args).await,
            Commands::Reconcile(args) => reconcile::run(args).await,
            Commands::Checkout(args) => checkout::run(args).await,
            Commands::Orders(command) => orders::run(command).await,
            Commands::Payouts(command) => payouts::run(command).await,
        }
    }
}
