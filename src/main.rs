//! REST API server for the supply-chain control tower
//!
//! Usage:
//!   ./target/release/control_tower [options]
//!
//! Options:
//!   --port PORT          Port to listen on (default: 8080)
//!   --data PATH          Shipment CSV loaded at startup
//!   --api-key KEY        Hosted model credential (or GEMINI_API_KEY)
//!   --model NAME         Hosted model name (default: gemini-pro)
//!   --timeout-secs N     Seconds to wait for the model (default: 30)
//!
//! REST endpoints:
//!   GET  /api/v1/health     - Health check
//!   GET  /api/v1/dataset    - Row count and available columns
//!   POST /api/v1/dataset    - Replace the working table (CSV body)
//!   GET  /api/v1/regions    - Region labels and default selection
//!   GET  /api/v1/kpis       - Headline metrics (?regions=A,B)
//!   GET  /api/v1/summary    - Digest and top regions
//!   GET  /api/v1/charts     - Chart series
//!   GET  /api/v1/map        - Flow-map arcs
//!   POST /api/v1/ask        - Ask the assistant {"query": "..."}
//!   POST /api/v1/risk       - Run the risk estimate

use anyhow::Result;
use clap::Parser;
use control_tower::{
    api::{self, DashboardService},
    config::{self, AdvisoryArgs, AdvisoryConfig, DEFAULT_DATA_PATH},
    table::ShipmentTable,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "control_tower")]
#[command(about = "Supply-chain control tower dashboard API")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Shipment CSV loaded at startup
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    #[command(flatten)]
    advisory: AdvisoryArgs,
}

fn print_banner(port: u16, rows: usize, model_enabled: bool) {
    println!("============================================================");
    println!("         SUPPLY-CHAIN CONTROL TOWER API SERVER");
    println!("============================================================");
    println!();
    println!("  Port:       {}", port);
    println!("  REST:       http://localhost:{}/api/v1/", port);
    println!("  Rows:       {}", rows);
    println!(
        "  Assistant:  {}",
        if model_enabled { "hosted model" } else { "simulation mode (no API key)" }
    );
    println!();
    println!("REST Endpoints:");
    println!("  GET  /api/v1/health      Health check");
    println!("  GET  /api/v1/dataset     Dataset info");
    println!("  POST /api/v1/dataset     Upload CSV");
    println!("  GET  /api/v1/regions     Region filter values");
    println!("  GET  /api/v1/kpis        KPI row");
    println!("  GET  /api/v1/summary     Digest + top regions");
    println!("  GET  /api/v1/charts      Chart series");
    println!("  GET  /api/v1/map         Flow-map arcs");
    println!("  POST /api/v1/ask         AI assistant");
    println!("  POST /api/v1/risk        Risk estimate");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    config::init_tracing();

    let args = Args::parse();
    let advisory = AdvisoryConfig::from(args.advisory);

    // A missing or unreadable file still serves an empty dashboard
    let table = match ShipmentTable::from_path(&args.data) {
        Ok(table) => table,
        Err(e) => {
            warn!("{:#}; starting with an empty dataset", e);
            ShipmentTable::empty()
        }
    };

    print_banner(args.port, table.len(), advisory.api_key.is_some());

    let service = Arc::new(DashboardService::new(table, advisory)?);
    let app = api::router(service);

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
