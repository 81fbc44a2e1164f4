use clap::{Args, Subcommand};
use jiff::Timestamp;
use rusty_money::iso::Currency;
use storefront::{
    commissions::{CommissionReport, ReportPeriod, VendorSummary},
    money,
};
use storefront_app::config::{DatabaseConfig, PricingConfig, TenantConfig};
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{input, output};

#[derive(Debug, Args)]
pub(crate) struct PayoutsCommand {
    #[command(subcommand)]
    command: PayoutsSubcommand,
}

#[derive(Debug, Subcommand)]
enum PayoutsSubcommand {
    /// Commission and payout totals per vendor
    Report(ReportArgs),
}

#[derive(Debug, Args)]
struct ReportArgs {
    /// Start of the period (inclusive), e.g. 2026-09-01T00:00:00Z
    #[arg(long)]
    from: Timestamp,

    /// End of the period (exclusive)
    #[arg(long)]
    to: Timestamp,

    /// Show only the highest-selling vendors
    #[arg(long)]
    top: Option<usize>,

    /// Print the full report as JSON instead of a table
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    tenant: TenantConfig,

    #[command(flatten)]
    pricing: PricingConfig,

    #[command(flatten)]
    database: DatabaseConfig,
}

#[derive(Tabled)]
struct VendorRow {
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Orders")]
    orders: usize,
    #[tabled(rename = "Sales")]
    sales: String,
    #[tabled(rename = "Commission")]
    commission: String,
    #[tabled(rename = "Payout")]
    payout: String,
}

pub(crate) async fn run(command: PayoutsCommand) -> Result<(), String> {
    match command.command {
        PayoutsSubcommand::Report(args) => report(args).await,
    }
}

async fn report(args: ReportArgs) -> Result<(), String> {
    let ReportArgs {
        from,
        to,
        top,
        json,
        tenant,
        pricing,
        database,
    } = args;

    let period = ReportPeriod::new(from, to).map_err(|error| error.to_string())?;

    let policy = input::load_policy(&pricing)?;
    let currency = policy.currency();

    let context = input::connect(&database, policy).await?;

    let report = context
        .payouts
        .commission_report(tenant.tenant(), period)
        .await
        .map_err(|error| format!("failed to build commission report: {error}"))?;

    if json {
        return output::print_json(&report);
    }

    let vendors = match top {
        Some(n) => report.top_vendors(n),
        None => report.vendors.as_slice(),
    };

    print_table(&report, vendors, currency);

    Ok(())
}

fn print_table(
    report: &CommissionReport,
    vendors: &[VendorSummary],
    currency: &Currency,
) {
    let rows = vendors.iter().map(|vendor| VendorRow {
        vendor: vendor.vendor_id.to_string(),
        rate: vendor.commission_rate.to_string(),
        orders: vendor.order_count,
        sales: money::format_minor(vendor.total_sales, currency),
        commission: money::format_minor(vendor.total_commission, currency),
        payout: money::format_minor(vendor.vendor_payouts, currency),
    });

    let mut table = Table::new(rows);
    table.with(Style::modern());

    #[expect(clippy::print_stdout, reason = "command output")]
    {
        println!("{table}");
        println!(
            "Total sales {}, commission {}, payouts {}",
            money::format_minor(report.totals.total_sales, currency),
            money::format_minor(report.totals.total_commission, currency),
            money::format_minor(report.totals.vendor_payouts, currency),
        );

        for missing in &report.omitted {
            println!(
                "Omitted {} (no commission rate): {} in sales",
                missing.vendor_id,
                money::format_minor(missing.skipped_sales, currency),
            );
        }
    }
}
