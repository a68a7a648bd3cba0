//! Statistical digest and dashboard panel series
//!
//! Every function here is total: a missing column or an empty table yields zero
//! or empty output, never an error.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::DeliveryStatus;
use crate::table::ShipmentTable;

/// Regions named in the narrative digest
pub const NARRATIVE_TOP_N: usize = 3;
/// Regions listed in the display panel
pub const PANEL_TOP_N: usize = 5;
/// Bars in the revenue and category charts
pub const CHART_TOP_N: usize = 10;

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatDigest {
    pub total_count: usize,
    pub total_sales: f64,
    pub late_count: usize,
    pub mean_shipping_days: Option<f64>,
    pub top_regions: Vec<String>,
    pub no_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub active_orders: usize,
    pub avg_shipping_days: Option<f64>,
    pub late_orders: usize,
    pub on_time_orders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Late,
    Advance,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: String,
    pub count: usize,
    pub percentage: f64,
    pub tone: StatusTone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRevenue {
    pub region: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyOrders {
    pub date: NaiveDate,
    pub orders: usize,
}

/// All chart series for the analytics view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub revenue_by_region: Vec<RegionRevenue>,
    pub shipping_modes: Vec<LabelCount>,
    pub daily_orders: Vec<DailyOrders>,
    pub top_categories: Vec<LabelCount>,
    pub status_breakdown: Vec<StatusShare>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Count labels, most frequent first; equal counts keep first-seen order.
fn value_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<LabelCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for label in labels {
        match index.get(label) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(label, counts.len());
                counts.push((label, 1));
            }
        }
    }

    // stable sort keeps first-seen order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

fn total_sales(table: &ShipmentTable) -> f64 {
    if !table.schema().has_sales {
        return 0.0;
    }
    table.rows().iter().filter_map(|r| r.sales).sum()
}

fn late_count(table: &ShipmentTable) -> usize {
    if !table.schema().has_status {
        return 0;
    }
    table.rows().iter().filter(|r| r.is_late()).count()
}

fn mean_shipping_days(table: &ShipmentTable) -> Option<f64> {
    if !table.schema().has_shipping_days {
        return None;
    }
    mean(table.rows().iter().filter_map(|r| r.shipping_days))
}

/// Count of rows whose order status carries the fraud flag
pub fn suspected_fraud_count(table: &ShipmentTable) -> usize {
    if !table.schema().has_order_status {
        return 0;
    }
    table.rows().iter().filter(|r| r.is_suspected_fraud()).count()
}

/// Parse the order-date formats seen in exports
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    const DATETIME_FORMATS: [&str; 2] = ["%m/%d/%Y %H:%M", "%Y-%m-%d %H:%M:%S"];
    let raw = raw.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .or_else(|| NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok())
}

/// `$1,234.56`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, frac)
}

// ============================================================================
// Digest
// ============================================================================

/// Regions ranked by order count
pub fn top_regions(table: &ShipmentTable, n: usize) -> Vec<LabelCount> {
    if !table.schema().has_region {
        return Vec::new();
    }
    let mut counts = value_counts(table.rows().iter().filter_map(|r| r.region.as_deref()));
    counts.truncate(n);
    counts
}

pub fn summarize(table: &ShipmentTable) -> StatDigest {
    StatDigest {
        total_count: table.len(),
        total_sales: total_sales(table),
        late_count: late_count(table),
        mean_shipping_days: mean_shipping_days(table),
        top_regions: top_regions(table, NARRATIVE_TOP_N)
            .into_iter()
            .map(|c| c.label)
            .collect(),
        no_data: table.is_empty(),
    }
}

// ============================================================================
// Panels
// ============================================================================

pub fn kpis(table: &ShipmentTable) -> Kpis {
    let on_time_orders = if table.schema().has_status {
        table
            .rows()
            .iter()
            .filter(|r| r.delivery_status == Some(DeliveryStatus::OnTime))
            .count()
    } else {
        0
    };

    Kpis {
        total_revenue: total_sales(table),
        active_orders: table.len(),
        avg_shipping_days: mean_shipping_days(table),
        late_orders: late_count(table),
        on_time_orders,
    }
}

/// Most common delivery statuses with their share of all rows
pub fn status_breakdown(table: &ShipmentTable, n: usize) -> Vec<StatusShare> {
    if !table.schema().has_status || table.is_empty() {
        return Vec::new();
    }
    let total = table.len() as f64;

    value_counts(
        table
            .rows()
            .iter()
            .filter_map(|r| r.delivery_status.as_ref())
            .map(DeliveryStatus::as_str),
    )
    .into_iter()
    .take(n)
    .map(|c| {
        let tone = if c.label.contains("Late") {
            StatusTone::Late
        } else if c.label.contains("Advance") {
            StatusTone::Advance
        } else {
            StatusTone::Neutral
        };
        StatusShare {
            percentage: (c.count as f64 / total * 1000.0).round() / 10.0,
            status: c.label,
            count: c.count,
            tone,
        }
    })
    .collect()
}

/// Regions ranked by summed sales
pub fn revenue_by_region(table: &ShipmentTable, n: usize) -> Vec<RegionRevenue> {
    let schema = table.schema();
    if !schema.has_region || !schema.has_sales {
        return Vec::new();
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<RegionRevenue> = Vec::new();
    for row in table.rows() {
        let Some(region) = row.region.as_deref() else {
            continue;
        };
        let i = *index.entry(region).or_insert_with(|| {
            sums.push(RegionRevenue {
                region: region.to_string(),
                sales: 0.0,
            });
            sums.len() - 1
        });
        sums[i].sales += row.sales.unwrap_or(0.0);
    }

    sums.sort_by(|a, b| b.sales.total_cmp(&a.sales));
    sums.truncate(n);
    sums
}

pub fn shipping_mode_distribution(table: &ShipmentTable) -> Vec<LabelCount> {
    if !table.schema().has_shipping_mode {
        return Vec::new();
    }
    value_counts(table.rows().iter().filter_map(|r| r.shipping_mode.as_deref()))
}

/// Orders per calendar day, oldest first
pub fn daily_order_trend(table: &ShipmentTable) -> Vec<DailyOrders> {
    if !table.schema().has_order_date {
        return Vec::new();
    }
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in table
        .rows()
        .iter()
        .filter_map(|r| r.order_date.as_deref())
        .filter_map(parse_order_date)
    {
        *by_day.entry(date).or_insert(0) += 1;
    }
    by_day
        .into_iter()
        .map(|(date, orders)| DailyOrders { date, orders })
        .collect()
}

pub fn top_categories(table: &ShipmentTable, n: usize) -> Vec<LabelCount> {
    if !table.schema().has_category {
        return Vec::new();
    }
    let mut counts = value_counts(table.rows().iter().filter_map(|r| r.category.as_deref()));
    counts.truncate(n);
    counts
}

pub fn chart_series(table: &ShipmentTable) -> ChartSeries {
    ChartSeries {
        revenue_by_region: revenue_by_region(table, CHART_TOP_N),
        shipping_modes: shipping_mode_distribution(table),
        daily_orders: daily_order_trend(table),
        top_categories: top_categories(table, CHART_TOP_N),
        status_breakdown: status_breakdown(table, NARRATIVE_TOP_N),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShipmentRecord;
    use crate::table::tests::{row, table};
    use crate::table::Schema;

    fn regions_only(labels: &[&str]) -> ShipmentTable {
        table(
            labels
                .iter()
                .map(|l| ShipmentRecord {
                    region: Some(l.to_string()),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn test_summarize_counts() {
        let mut rows: Vec<ShipmentRecord> = (0..7)
            .map(|i| row("Canada", "Shipping on time", i as f64))
            .collect();
        rows.extend((0..3).map(|_| row("Oceania", "Late delivery", 10.0)));
        let t = table(rows);

        let digest = summarize(&t);
        assert_eq!(digest.total_count, 10);
        assert_eq!(digest.late_count, 3);
        assert_eq!(digest.total_sales, 21.0 + 30.0);
        assert_eq!(digest.mean_shipping_days, Some(3.0));
        assert_eq!(digest.top_regions, vec!["Canada", "Oceania"]);
        assert!(!digest.no_data);
    }

    #[test]
    fn test_summarize_empty() {
        let digest = summarize(&ShipmentTable::empty());
        assert_eq!(digest.total_count, 0);
        assert_eq!(digest.total_sales, 0.0);
        assert_eq!(digest.late_count, 0);
        assert_eq!(digest.mean_shipping_days, None);
        assert!(digest.top_regions.is_empty());
        assert!(digest.no_data);

        let full_schema_empty = table(vec![]);
        assert_eq!(summarize(&full_schema_empty).mean_shipping_days, None);
    }

    #[test]
    fn test_summarize_missing_columns() {
        let rows = vec![row("Canada", "Late delivery", 50.0)];
        let schema = Schema {
            has_region: true,
            ..Default::default()
        };
        let t = ShipmentTable::from_records(schema, rows);

        let digest = summarize(&t);
        assert_eq!(digest.total_count, 1);
        assert_eq!(digest.total_sales, 0.0);
        assert_eq!(digest.late_count, 0);
        assert_eq!(digest.mean_shipping_days, None);
        assert_eq!(digest.top_regions, vec!["Canada"]);
    }

    #[test]
    fn test_top_regions_by_frequency() {
        let t = regions_only(&["A", "A", "B", "B", "B", "C"]);
        let top = top_regions(&t, 1);
        assert_eq!(top[0].label, "B");
        assert_eq!(top[0].count, 3);
    }

    #[test]
    fn test_top_regions_ties_first_seen() {
        let t = regions_only(&["C", "A", "B", "A", "C", "B", "D"]);
        let labels: Vec<String> = top_regions(&t, PANEL_TOP_N)
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1234.567), "$1,234.57");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-42.1), "-$42.10");
    }

    #[test]
    fn test_status_breakdown() {
        let t = table(vec![
            row("A", "Late delivery", 1.0),
            row("A", "Late delivery", 1.0),
            row("A", "Advance shipping", 1.0),
            row("A", "Shipping canceled", 1.0),
        ]);
        let shares = status_breakdown(&t, 3);

        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0].status, "Late delivery");
        assert_eq!(shares[0].percentage, 50.0);
        assert_eq!(shares[0].tone, StatusTone::Late);
        assert_eq!(shares[1].tone, StatusTone::Advance);
        assert_eq!(shares[2].tone, StatusTone::Neutral);
    }

    #[test]
    fn test_revenue_by_region() {
        let t = table(vec![
            row("Canada", "Late delivery", 10.0),
            row("Oceania", "Late delivery", 25.0),
            row("Canada", "Late delivery", 20.0),
            row("Caribbean", "Late delivery", 1.0),
        ]);
        let revenue = revenue_by_region(&t, 2);

        assert_eq!(revenue.len(), 2);
        assert_eq!(revenue[0].region, "Canada");
        assert_eq!(revenue[0].sales, 30.0);
        assert_eq!(revenue[1].region, "Oceania");
    }

    #[test]
    fn test_daily_order_trend() {
        let dated = |date: &str| ShipmentRecord {
            order_date: Some(date.to_string()),
            ..Default::default()
        };
        let t = table(vec![
            dated("1/31/2018 22:56"),
            dated("1/13/2018 12:27"),
            dated("2018-01-31 08:00:00"),
            dated("not a date"),
        ]);
        let trend = daily_order_trend(&t);

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2018, 1, 13).unwrap());
        assert_eq!(trend[1].orders, 2);
    }

    #[test]
    fn test_kpis_and_categories() {
        let mut rows = vec![
            row("A", "Shipping on time", 100.0),
            row("A", "Late delivery", 50.0),
        ];
        rows[0].category = Some("Cleats".to_string());
        rows[1].category = Some("Cleats".to_string());
        rows[0].shipping_mode = Some("Standard Class".to_string());
        let t = table(rows);

        let k = kpis(&t);
        assert_eq!(k.total_revenue, 150.0);
        assert_eq!(k.active_orders, 2);
        assert_eq!(k.late_orders, 1);
        assert_eq!(k.on_time_orders, 1);

        let categories = top_categories(&t, CHART_TOP_N);
        assert_eq!(categories, vec![LabelCount { label: "Cleats".to_string(), count: 2 }]);
        assert_eq!(shipping_mode_distribution(&t)[0].label, "Standard Class");
    }
}
