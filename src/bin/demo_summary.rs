//! Dataset Summary Demo
//! Run: ./target/release/demo_summary [--data PATH] [--regions A,B]

use anyhow::Result;
use clap::Parser;
use control_tower::{
    aggregator::{self, format_currency, CHART_TOP_N, PANEL_TOP_N},
    arcs,
    config::{self, DEFAULT_DATA_PATH},
    table::ShipmentTable,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "demo_summary")]
#[command(about = "Print the dashboard panels for a shipment CSV")]
struct Args {
    /// Shipment CSV
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Comma-separated region filter
    #[arg(long, value_delimiter = ',')]
    regions: Vec<String>,
}

fn print_section(title: &str) {
    println!("\n{}", title);
    println!("{}", "-".repeat(50));
}

fn main() -> Result<()> {
    config::init_tracing();
    let args = Args::parse();

    let table = ShipmentTable::from_path(&args.data)?.filter_regions(&args.regions);

    println!("\n{}", "=".repeat(60));
    println!("         SUPPLY-CHAIN CONTROL TOWER SUMMARY");
    println!("{}\n", "=".repeat(60));

    let kpis = aggregator::kpis(&table);
    println!("KPIS");
    println!("{}", "-".repeat(50));
    println!("  Total Revenue:      {:>16}", format_currency(kpis.total_revenue));
    println!("  Active Orders:      {:>16}", kpis.active_orders);
    match kpis.avg_shipping_days {
        Some(days) => println!("  Avg Shipping Time:  {:>11.1} days", days),
        None => println!("  Avg Shipping Time:  {:>16}", "N/A"),
    }
    println!("  Late Orders:        {:>16}", kpis.late_orders);

    print_section("DELIVERY PERFORMANCE");
    for share in aggregator::status_breakdown(&table, 3) {
        let bar = "#".repeat((share.percentage / 2.0) as usize);
        println!("  {:20} {:>7} ({:>5.1}%) {}", share.status, share.count, share.percentage, bar);
    }

    print_section("TOP REGIONS");
    for region in aggregator::top_regions(&table, PANEL_TOP_N) {
        println!("  {:20} {:>7} orders", region.label, region.count);
    }

    print_section("REVENUE BY REGION");
    for region in aggregator::revenue_by_region(&table, CHART_TOP_N) {
        println!("  {:20} {:>16}", region.region, format_currency(region.sales));
    }

    print_section("SHIPPING MODES");
    for mode in aggregator::shipping_mode_distribution(&table) {
        println!("  {:20} {:>7}", mode.label, mode.count);
    }

    print_section("TOP CATEGORIES");
    for category in aggregator::top_categories(&table, CHART_TOP_N) {
        println!("  {:20} {:>7}", category.label, category.count);
    }

    let trend = aggregator::daily_order_trend(&table);
    if let (Some(first), Some(last)) = (trend.first(), trend.last()) {
        print_section("ORDER DATES");
        println!("  From: {}  To: {}  ({} days with orders)", first.date, last.date, trend.len());
    }

    print_section("FLOW MAP");
    match arcs::build_arcs(&table) {
        Some(arcs) => {
            let late = arcs.iter().filter(|a| a.color == arcs::LATE_COLOR).count();
            println!("  {} arcs ({} late)", arcs.len(), late);
        }
        None => println!("  Map data incomplete: region or coordinate columns missing"),
    }

    println!("\n{}", "=".repeat(60));
    println!();

    Ok(())
}
