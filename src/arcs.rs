//! Flow-map arcs: distribution centre -> customer, one per shipment.

use serde::Serialize;

use crate::geo;
use crate::models::GeoPoint;
use crate::table::ShipmentTable;

/// Rows drawn per map
pub const MAX_ARCS: usize = 2000;

pub const ARC_ALPHA: u8 = 150;
pub const LATE_COLOR: [u8; 4] = [255, 0, 0, ARC_ALPHA];
pub const ON_TRACK_COLOR: [u8; 4] = [0, 255, 0, ARC_ALPHA];

pub const MAP_STYLE: &str = "mapbox://styles/mapbox/dark-v10";
pub const TOOLTIP: &str = "Order: {order_id}\nStatus: {delivery_status}\nProduct: {product_name}";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcRecord {
    pub source: GeoPoint,
    pub target: GeoPoint,
    pub color: [u8; 4],
    pub order_id: Option<String>,
    pub delivery_status: Option<String>,
    pub product_name: Option<String>,
}

/// Initial camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            latitude: 20.0,
            longitude: 0.0,
            zoom: 1.5,
            pitch: 45.0,
            bearing: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowMap {
    pub arcs: Vec<ArcRecord>,
    pub view: ViewState,
    pub map_style: &'static str,
    pub tooltip: &'static str,
}

/// Arcs for the first [`MAX_ARCS`] rows, in input order.
///
/// Returns `None` when the table has no region or coordinate columns. Rows without
/// their own coordinates are skipped.
pub fn build_arcs(table: &ShipmentTable) -> Option<Vec<ArcRecord>> {
    let schema = table.schema();
    if !schema.has_region || !schema.has_coordinates {
        return None;
    }

    let arcs = table
        .rows()
        .iter()
        .take(MAX_ARCS)
        .filter_map(|row| {
            let target = row.destination?;
            let color = if row.is_late() { LATE_COLOR } else { ON_TRACK_COLOR };
            Some(ArcRecord {
                source: geo::resolve(row.region.as_deref().unwrap_or_default()),
                target,
                color,
                order_id: row.order_id.clone(),
                delivery_status: row.delivery_status.as_ref().map(|s| s.as_str().to_string()),
                product_name: row.product_name.clone(),
            })
        })
        .collect();

    Some(arcs)
}

pub fn build_flow_map(table: &ShipmentTable) -> Option<FlowMap> {
    build_arcs(table).map(|arcs| FlowMap {
        arcs,
        view: ViewState::default(),
        map_style: MAP_STYLE,
        tooltip: TOOLTIP,
    })
}
