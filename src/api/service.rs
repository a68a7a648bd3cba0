//! Shared business logic for the dashboard API
//!
//! Holds the working table and the advisory responder. Each request takes a snapshot
//! of the table and runs to completion on it; uploads swap in a new table.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::advisory::{AdvisoryResponder, AdvisoryResponse, GeminiClient};
use crate::aggregator::{self, ChartSeries, Kpis, LabelCount, StatDigest, PANEL_TOP_N};
use crate::arcs::{self, FlowMap};
use crate::config::AdvisoryConfig;
use crate::risk::{self, RiskReport};
use crate::table::{Schema, ShipmentTable};

pub const MAP_WARNING: &str = "Map data incomplete. Check 'Order Region', 'Latitude' and 'Longitude' columns.";

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub rows: usize,
    pub schema: Schema,
    pub missing_columns: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionList {
    pub regions: Vec<String>,
    pub default_selection: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub digest: StatDigest,
    pub top_regions: Vec<LabelCount>,
}

/// Flow map, or the reason it cannot be drawn
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub renderable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<FlowMap>,
}

// ============================================================================
// Dashboard Service
// ============================================================================

pub struct DashboardService {
    table: Arc<RwLock<Arc<ShipmentTable>>>,
    advisor: AdvisoryResponder<GeminiClient>,
}

impl DashboardService {
    pub fn new(table: ShipmentTable, config: AdvisoryConfig) -> Result<Self> {
        let timeout = config.timeout();
        let client = GeminiClient::new(config)?;
        Ok(Self {
            table: Arc::new(RwLock::new(Arc::new(table))),
            advisor: AdvisoryResponder::new(client, timeout),
        })
    }

    /// Working table restricted to `selection` (all rows when empty)
    async fn view(&self, selection: &[String]) -> Arc<ShipmentTable> {
        let table = self.table.read().await.clone();
        if selection.is_empty() {
            table
        } else {
            Arc::new(table.filter_regions(selection))
        }
    }

    pub async fn dataset_info(&self) -> DatasetInfo {
        let table = self.view(&[]).await;
        DatasetInfo {
            rows: table.len(),
            schema: *table.schema(),
            missing_columns: table.schema().missing_columns(),
        }
    }

    /// Parse `csv` and make it the working table
    pub async fn replace_dataset(&self, csv: &[u8]) -> Result<DatasetInfo> {
        let table = ShipmentTable::from_reader(csv).context("Failed to parse uploaded dataset")?;
        info!("New dataset received: {} rows", table.len());
        {
            let mut current = self.table.write().await;
            *current = Arc::new(table);
        }
        Ok(self.dataset_info().await)
    }

    pub async fn regions(&self) -> RegionList {
        let table = self.view(&[]).await;
        RegionList {
            regions: table.regions(),
            default_selection: table.default_selection(),
        }
    }

    pub async fn kpis(&self, selection: &[String]) -> Kpis {
        let table = self.view(selection).await;
        aggregator::kpis(&table)
    }

    pub async fn summary(&self, selection: &[String]) -> Summary {
        let table = self.view(selection).await;
        Summary {
            digest: aggregator::summarize(&table),
            top_regions: aggregator::top_regions(&table, PANEL_TOP_N),
        }
    }

    pub async fn charts(&self, selection: &[String]) -> ChartSeries {
        let table = self.view(selection).await;
        aggregator::chart_series(&table)
    }

    pub async fn flow_map(&self, selection: &[String]) -> MapView {
        let table = self.view(selection).await;
        match arcs::build_flow_map(&table) {
            Some(map) => MapView {
                renderable: true,
                warning: None,
                map: Some(map),
            },
            None => MapView {
                renderable: false,
                warning: Some(MAP_WARNING),
                map: None,
            },
        }
    }

    pub async fn ask(&self, query: &str, selection: &[String]) -> AdvisoryResponse {
        let table = self.view(selection).await;
        self.advisor.respond(&table, query).await
    }

    pub async fn risk(&self, selection: &[String]) -> RiskReport {
        let table = self.view(selection).await;
        risk::estimate_risk(&table, &mut rand::thread_rng())
    }
}
