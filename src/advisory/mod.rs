//! Advisory responder
//!
//! Answers a free-text question about the working table. The digest is rendered into
//! a prompt for the hosted model; if that single call fails for any reason the answer
//! comes from a fixed, ordered keyword table instead.

pub mod gemini;

use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::aggregator::{format_currency, summarize, suspected_fraud_count, StatDigest};
use crate::table::ShipmentTable;

pub use gemini::GeminiClient;

pub const NO_DATA_RESPONSE: &str = "I have no data loaded to analyze yet.";
pub const SIMULATION_PREFIX: &str = "[API Error. Running in Simulation Mode]";

const SYSTEM_PROMPT: &str = "You are Nexus AI, a supply chain expert assistant.";

/// Why the hosted model produced no answer
#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("no API key configured for the advisory model")]
    MissingCredential,
    #[error("request to advisory model failed: {0}")]
    Transport(String),
    #[error("advisory model returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed advisory response: {0}")]
    MalformedResponse(String),
    #[error("advisory model returned no text")]
    EmptyCompletion,
    #[error("advisory model timed out after {0:?}")]
    Timeout(Duration),
}

/// Text-in/text-out hosted model
pub trait AdvisoryModel {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, AdvisoryError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Model,
    Fallback,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisoryResponse {
    pub text: String,
    pub source: ResponseSource,
}

// ============================================================================
// Prompt
// ============================================================================

/// Digest lines embedded in the prompt
pub fn context_block(digest: &StatDigest) -> String {
    format!(
        "Dataset Summary:\n\
         - Total Orders: {}\n\
         - Total Sales: {}\n\
         - Late Orders: {}\n\
         - Average Shipping Time: {:.1} days\n\
         - Top Regions: {}",
        digest.total_count,
        format_currency(digest.total_sales),
        digest.late_count,
        digest.mean_shipping_days.unwrap_or(0.0),
        digest.top_regions.join(", "),
    )
}

pub fn compose_prompt(context: &str, query: &str) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\
         You have access to the following real-time logistics data summary:\n\
         {context}\n\n\
         Answer the user's question based on this data.\n\
         If the answer isn't in the summary, make a reasonable inference based on general supply chain knowledge.\n\
         Keep your answer concise and professional.\n\n\
         User Question: {query}"
    )
}

// ============================================================================
// Fallback rules
// ============================================================================

/// Inputs available to a fallback template
pub struct FallbackContext<'a> {
    pub table: &'a ShipmentTable,
    pub failure: &'a str,
}

/// Keyword set and the template it selects
pub struct FallbackRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub render: fn(&FallbackContext) -> String,
}

impl FallbackRule {
    fn matches(&self, query: &str) -> bool {
        self.keywords.iter().any(|k| query.contains(k))
    }
}

/// Evaluated in order; first match wins.
pub static FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        name: "delays",
        keywords: &["delay", "late"],
        render: |ctx| {
            let late = summarize(ctx.table).late_count;
            format!(
                "I found {} late orders. Delays in simulation mode are illustrative: \
                 port congestion on trans-Pacific lanes is a typical cause.",
                late
            )
        },
    },
    FallbackRule {
        name: "revenue",
        keywords: &["cost", "sales", "revenue"],
        render: |ctx| {
            let sales = summarize(ctx.table).total_sales;
            format!(
                "Total sales revenue is {}. Margin figures are not available offline; \
                 a 12% margin is used as an illustrative placeholder.",
                format_currency(sales)
            )
        },
    },
    FallbackRule {
        name: "fraud",
        keywords: &["fraud"],
        render: |ctx| {
            format!(
                "There are {} orders flagged as suspected fraud. Recommend immediate review.",
                suspected_fraud_count(ctx.table)
            )
        },
    },
];

fn generic_response(ctx: &FallbackContext) -> String {
    format!(
        "I'm analyzing the latest logistics data... Everything seems to be operating \
         within normal parameters. (Error: {})",
        ctx.failure
    )
}

/// Local answer used when the hosted model is unavailable
pub fn fallback_response(table: &ShipmentTable, query: &str, failure: &str) -> String {
    let query = query.to_lowercase();
    let ctx = FallbackContext { table, failure };

    let body = match FALLBACK_RULES.iter().find(|rule| rule.matches(&query)) {
        Some(rule) => {
            debug!("Fallback rule '{}' matched", rule.name);
            (rule.render)(&ctx)
        }
        None => generic_response(&ctx),
    };

    format!("{}\n\n{}", SIMULATION_PREFIX, body)
}

// ============================================================================
// Responder
// ============================================================================

pub struct AdvisoryResponder<M> {
    model: M,
    timeout: Duration,
}

impl<M: AdvisoryModel> AdvisoryResponder<M> {
    pub fn new(model: M, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Answer `query` about `table`. Never fails; a model failure or timeout is
    /// answered from [`FALLBACK_RULES`].
    pub async fn respond(&self, table: &ShipmentTable, query: &str) -> AdvisoryResponse {
        if table.is_empty() {
            return AdvisoryResponse {
                text: NO_DATA_RESPONSE.to_string(),
                source: ResponseSource::NoData,
            };
        }

        let prompt = compose_prompt(&context_block(&summarize(table)), query);

        let call = tokio::time::timeout(self.timeout, self.model.complete(&prompt));
        let outcome = match call.await {
            Ok(Ok(text)) if !text.trim().is_empty() => Ok(text),
            Ok(Ok(_)) => Err(AdvisoryError::EmptyCompletion),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AdvisoryError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(text) => AdvisoryResponse {
                text,
                source: ResponseSource::Model,
            },
            Err(e) => {
                warn!("Advisory model unavailable, answering locally: {}", e);
                AdvisoryResponse {
                    text: fallback_response(table, query, &e.to_string()),
                    source: ResponseSource::Fallback,
                }
            }
        }
    }
}
