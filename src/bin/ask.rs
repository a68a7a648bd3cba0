//! Ask the assistant one question about a shipment CSV
//!
//! Run: ./target/release/ask --data DataCoSupplyChainDataset.csv "How many late deliveries?"
//!
//! Without GEMINI_API_KEY the answer comes from the local rules.

use anyhow::Result;
use clap::Parser;
use control_tower::{
    advisory::{AdvisoryResponder, GeminiClient},
    config::{self, AdvisoryArgs, AdvisoryConfig, DEFAULT_DATA_PATH},
    table::ShipmentTable,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ask")]
#[command(about = "Ask the supply-chain assistant a question")]
struct Args {
    /// Question to ask
    query: String,

    /// Shipment CSV
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Comma-separated region filter
    #[arg(long, value_delimiter = ',')]
    regions: Vec<String>,

    #[command(flatten)]
    advisory: AdvisoryArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    config::init_tracing();
    let args = Args::parse();

    let table = ShipmentTable::from_path(&args.data)?.filter_regions(&args.regions);

    let advisory = AdvisoryConfig::from(args.advisory);
    let timeout = advisory.timeout();
    let responder = AdvisoryResponder::new(GeminiClient::new(advisory)?, timeout);

    let response = responder.respond(&table, &args.query).await;
    println!("{}", response.text);

    Ok(())
}
