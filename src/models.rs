use serde::{Deserialize, Serialize};

/// Raw record from CSV ingestion, keyed by the dataset's column headers.
///
/// Every field is optional: a column may be missing from the file entirely or a cell
/// may be blank. Numeric cells that fail to parse become `None` instead of rejecting
/// the row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsvRecord {
    #[serde(rename = "Order Region", default)]
    pub order_region: Option<String>,
    #[serde(rename = "Delivery Status", default)]
    pub delivery_status: Option<String>,
    #[serde(rename = "Sales", default, deserialize_with = "csv::invalid_option")]
    pub sales: Option<f64>,
    #[serde(
        rename = "Days for shipping (real)",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub days_for_shipping: Option<f64>,
    #[serde(rename = "Latitude", default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude", default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,
    #[serde(rename = "Order Id", default)]
    pub order_id: Option<String>,
    #[serde(rename = "Product Name", default)]
    pub product_name: Option<String>,
    #[serde(rename = "order date (DateOrders)", default)]
    pub order_date: Option<String>,
    #[serde(rename = "Shipping Mode", default)]
    pub shipping_mode: Option<String>,
    #[serde(rename = "Category Name", default)]
    pub category_name: Option<String>,
    #[serde(rename = "Order Status", default)]
    pub order_status: Option<String>,
}

/// Column headers the loader knows about
pub mod columns {
    pub const ORDER_REGION: &str = "Order Region";
    pub const DELIVERY_STATUS: &str = "Delivery Status";
    pub const SALES: &str = "Sales";
    pub const DAYS_FOR_SHIPPING: &str = "Days for shipping (real)";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const ORDER_ID: &str = "Order Id";
    pub const PRODUCT_NAME: &str = "Product Name";
    pub const ORDER_DATE: &str = "order date (DateOrders)";
    pub const SHIPPING_MODE: &str = "Shipping Mode";
    pub const CATEGORY_NAME: &str = "Category Name";
    pub const ORDER_STATUS: &str = "Order Status";
}

/// Delivery status designation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DeliveryStatus {
    Late,
    OnTime,
    Advance,
    Other(String),
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DeliveryStatus::Late => "Late delivery",
            DeliveryStatus::OnTime => "Shipping on time",
            DeliveryStatus::Advance => "Advance shipping",
            DeliveryStatus::Other(s) => s,
        }
    }

    pub fn is_late(&self) -> bool {
        matches!(self, DeliveryStatus::Late)
    }
}

impl From<&str> for DeliveryStatus {
    fn from(s: &str) -> Self {
        match s {
            "Late delivery" => DeliveryStatus::Late,
            "Shipping on time" => DeliveryStatus::OnTime,
            "Advance shipping" => DeliveryStatus::Advance,
            other => DeliveryStatus::Other(other.to_string()),
        }
    }
}

/// Order status value that marks an order for fraud review
pub const SUSPECTED_FRAUD: &str = "SUSPECTED_FRAUD";

/// Geographic point, degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One row of the working table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShipmentRecord {
    pub region: Option<String>,
    pub delivery_status: Option<DeliveryStatus>,
    pub sales: Option<f64>,
    pub shipping_days: Option<f64>,
    pub destination: Option<GeoPoint>,
    pub order_id: Option<String>,
    pub product_name: Option<String>,
    pub order_date: Option<String>,
    pub shipping_mode: Option<String>,
    pub category: Option<String>,
    pub order_status: Option<String>,
}

impl ShipmentRecord {
    pub fn is_late(&self) -> bool {
        self.delivery_status.as_ref().is_some_and(DeliveryStatus::is_late)
    }

    pub fn is_suspected_fraud(&self) -> bool {
        self.order_status.as_deref() == Some(SUSPECTED_FRAUD)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl CsvRecord {
    pub fn to_shipment(&self) -> ShipmentRecord {
        let destination = match (finite(self.latitude), finite(self.longitude)) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };

        ShipmentRecord {
            region: non_blank(&self.order_region),
            delivery_status: non_blank(&self.delivery_status)
                .map(|s| DeliveryStatus::from(s.as_str())),
            sales: finite(self.sales),
            shipping_days: finite(self.days_for_shipping),
            destination,
            order_id: non_blank(&self.order_id),
            product_name: non_blank(&self.product_name),
            order_date: non_blank(&self.order_date),
            shipping_mode: non_blank(&self.shipping_mode),
            category: non_blank(&self.category_name),
            order_status: non_blank(&self.order_status),
        }
    }
}
