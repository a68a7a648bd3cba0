//! Placeholder delivery-risk estimate.
//!
//! No model is trained: accuracy is fixed and the risk percentage is drawn from the
//! injected random source, so seeded callers get reproducible output.

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::table::ShipmentTable;

pub const REPORTED_ACCURACY: f64 = 87.5;
pub const MIN_RISK: u8 = 15;
pub const MAX_RISK: u8 = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_percentage(pct: u8) -> Self {
        if pct > 30 {
            RiskLevel::High
        } else if pct > 15 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            RiskLevel::High => "High Risk Detected",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::Low => "Low Risk",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::High => {
                "Recommend immediate review of late shipments and resource allocation."
            }
            RiskLevel::Moderate => "Monitor closely. Consider optimizing shipping routes.",
            RiskLevel::Low => "Supply chain operating within normal parameters.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub accuracy: f64,
    pub risk_percentage: u8,
    pub level: RiskLevel,
    pub headline: &'static str,
    pub recommendation: &'static str,
}

pub fn estimate_risk<R: Rng + ?Sized>(table: &ShipmentTable, rng: &mut R) -> RiskReport {
    let risk_percentage = rng.gen_range(MIN_RISK..=MAX_RISK);
    let level = RiskLevel::from_percentage(risk_percentage);
    info!(
        "Risk estimate over {} rows: {}% ({:?})",
        table.len(),
        risk_percentage,
        level
    );

    RiskReport {
        accuracy: REPORTED_ACCURACY,
        risk_percentage,
        level,
        headline: level.headline(),
        recommendation: level.recommendation(),
    }
}
