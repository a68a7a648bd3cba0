//! Working table: the loaded shipment rows plus the column capabilities of the source.

use anyhow::{Context, Result};
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{columns, CsvRecord, ShipmentRecord};

/// Number of regions pre-selected when no filter is given by the caller.
pub const DEFAULT_SELECTION: usize = 3;

/// Which expected columns the source actually carried.
///
/// Built once from the header row; downstream code checks these flags instead of
/// probing rows for missing fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub has_region: bool,
    pub has_status: bool,
    pub has_sales: bool,
    pub has_shipping_days: bool,
    pub has_coordinates: bool,
    pub has_order_id: bool,
    pub has_product: bool,
    pub has_order_date: bool,
    pub has_shipping_mode: bool,
    pub has_category: bool,
    pub has_order_status: bool,
}

impl Schema {
    /// Every expected column present
    pub fn full() -> Self {
        Self {
            has_region: true,
            has_status: true,
            has_sales: true,
            has_shipping_days: true,
            has_coordinates: true,
            has_order_id: true,
            has_product: true,
            has_order_date: true,
            has_shipping_mode: true,
            has_category: true,
            has_order_status: true,
        }
    }

    pub fn from_headers(headers: &StringRecord) -> Self {
        let names: HashSet<&str> = headers.iter().map(str::trim).collect();
        let has = |column: &str| names.contains(column);

        Self {
            has_region: has(columns::ORDER_REGION),
            has_status: has(columns::DELIVERY_STATUS),
            has_sales: has(columns::SALES),
            has_shipping_days: has(columns::DAYS_FOR_SHIPPING),
            has_coordinates: has(columns::LATITUDE) && has(columns::LONGITUDE),
            has_order_id: has(columns::ORDER_ID),
            has_product: has(columns::PRODUCT_NAME),
            has_order_date: has(columns::ORDER_DATE),
            has_shipping_mode: has(columns::SHIPPING_MODE),
            has_category: has(columns::CATEGORY_NAME),
            has_order_status: has(columns::ORDER_STATUS),
        }
    }

    /// Headers the aggregator and map expect but the source lacks
    pub fn missing_columns(&self) -> Vec<&'static str> {
        let checks = [
            (self.has_region, columns::ORDER_REGION),
            (self.has_status, columns::DELIVERY_STATUS),
            (self.has_sales, columns::SALES),
            (self.has_shipping_days, columns::DAYS_FOR_SHIPPING),
            (self.has_coordinates, "Latitude/Longitude"),
            (self.has_order_id, columns::ORDER_ID),
            (self.has_product, columns::PRODUCT_NAME),
            (self.has_order_date, columns::ORDER_DATE),
            (self.has_shipping_mode, columns::SHIPPING_MODE),
            (self.has_category, columns::CATEGORY_NAME),
            (self.has_order_status, columns::ORDER_STATUS),
        ];
        checks
            .into_iter()
            .filter(|(present, _)| !present)
            .map(|(_, name)| name)
            .collect()
    }
}

/// Read-only shipment table
#[derive(Debug, Clone, Default)]
pub struct ShipmentTable {
    schema: Schema,
    rows: Vec<ShipmentRecord>,
}

impl ShipmentTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records(schema: Schema, rows: Vec<ShipmentRecord>) -> Self {
        Self { schema, rows }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading CSV from {:?}", path);
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open dataset {}", path.display()))?;
        Self::from_reader(file)
    }

    /// Parse CSV from any reader. Cells are decoded as UTF-8 where valid and as
    /// ISO-8859-1 otherwise, which is how the public supply-chain exports are encoded.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        // Padded names like " Sales" must match both the schema and the row fields
        let raw_headers = reader.byte_headers().context("Failed to read CSV header")?;
        let headers: StringRecord = decode_record(raw_headers)
            .iter()
            .map(str::trim)
            .collect();
        let schema = Schema::from_headers(&headers);

        let mut rows = Vec::new();
        let mut error_count = 0;
        let mut raw = ByteRecord::new();

        loop {
            match reader.read_byte_record(&mut raw) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    if error_count < 5 {
                        warn!("Failed to read record {}: {}", rows.len() + error_count, e);
                    }
                    error_count += 1;
                    if e.is_io_error() {
                        break;
                    }
                    continue;
                }
            }

            match decode_record(&raw).deserialize::<CsvRecord>(Some(&headers)) {
                Ok(record) => rows.push(record.to_shipment()),
                Err(e) => {
                    if error_count < 5 {
                        warn!("Failed to parse record {}: {}", rows.len() + error_count, e);
                    }
                    error_count += 1;
                }
            }
        }

        let missing = schema.missing_columns();
        if !missing.is_empty() {
            warn!("Dataset is missing columns: {}", missing.join(", "));
        }
        info!("Loaded {} rows ({} skipped)", rows.len(), error_count);

        Ok(Self { schema, rows })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[ShipmentRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Unique region labels in first-seen order
    pub fn regions(&self) -> Vec<String> {
        if !self.schema.has_region {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|r| r.region.as_deref())
            .filter(|region| seen.insert(*region))
            .map(str::to_string)
            .collect()
    }

    /// Regions pre-selected on first view
    pub fn default_selection(&self) -> Vec<String> {
        self.regions().into_iter().take(DEFAULT_SELECTION).collect()
    }

    /// Rows whose region is in `selection`. An empty selection keeps every row, as does
    /// a table without a region column.
    pub fn filter_regions(&self, selection: &[String]) -> ShipmentTable {
        if selection.is_empty() || !self.schema.has_region {
            return self.clone();
        }
        let wanted: HashSet<&str> = selection.iter().map(String::as_str).collect();
        let rows = self
            .rows
            .iter()
            .filter(|r| r.region.as_deref().is_some_and(|region| wanted.contains(region)))
            .cloned()
            .collect();
        Self {
            schema: self.schema,
            rows,
        }
    }
}

fn decode_record(raw: &ByteRecord) -> StringRecord {
    raw.iter().map(decode_field).collect()
}

fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // ISO-8859-1 maps every byte to the code point of the same value
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{DeliveryStatus, GeoPoint};

    /// Row with region, status and sales set; everything else blank
    pub(crate) fn row(region: &str, status: &str, sales: f64) -> ShipmentRecord {
        ShipmentRecord {
            region: Some(region.to_string()),
            delivery_status: Some(DeliveryStatus::from(status)),
            sales: Some(sales),
            shipping_days: Some(3.0),
            destination: Some(GeoPoint::new(18.0, -66.0)),
            order_id: Some("1".to_string()),
            product_name: Some("Smart watch".to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn table(rows: Vec<ShipmentRecord>) -> ShipmentTable {
        ShipmentTable::from_records(Schema::full(), rows)
    }

    const SAMPLE: &str = "\
Order Id,Order Region,Delivery Status,Sales,Days for shipping (real),Latitude,Longitude,Product Name,Order Status
1,Western Europe,Late delivery,327.75,6,18.25,-66.03,Smart watch,COMPLETE
2,Oceania,Shipping on time,,2,-27.47,153.02,Field & Stream,SUSPECTED_FRAUD
3,Western Europe,Advance shipping,abc,4,35.77,-78.63,Perfect Fitness,PENDING
";

    #[test]
    fn test_load_sample() {
        let table = ShipmentTable::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.schema().has_sales);
        assert!(table.schema().has_coordinates);
        assert!(!table.schema().has_shipping_mode);
        assert!(!table.schema().has_order_date);

        let rows = table.rows();
        assert_eq!(rows[0].sales, Some(327.75));
        assert_eq!(rows[1].sales, None);
        assert_eq!(rows[2].sales, None);
        assert!(rows[0].is_late());
        assert!(rows[1].is_suspected_fraud());
        assert_eq!(rows[2].destination, Some(GeoPoint::new(35.77, -78.63)));
    }

    #[test]
    fn test_missing_columns_listed() {
        let csv = "Order Id,Latitude\n1,10.0\n";
        let table = ShipmentTable::from_reader(csv.as_bytes()).unwrap();

        assert!(!table.schema().has_coordinates);
        let missing = table.schema().missing_columns();
        assert!(missing.contains(&"Sales"));
        assert!(missing.contains(&"Latitude/Longitude"));
        assert!(!missing.contains(&"Order Id"));
    }

    #[test]
    fn test_latin1_fallback() {
        let mut csv = b"Order Region,Product Name\nSouth America,".to_vec();
        csv.extend_from_slice(&[b'C', 0xE1, b'm', b'a', b'r', b'a']);
        csv.push(b'\n');

        let table = ShipmentTable::from_reader(csv.as_slice()).unwrap();
        assert_eq!(table.rows()[0].product_name.as_deref(), Some("Cámara"));
    }

    #[test]
    fn test_padded_headers() {
        let csv = "Order Region , Sales\nCanada,10\n";
        let table = ShipmentTable::from_reader(csv.as_bytes()).unwrap();
        assert!(table.schema().has_region);
        assert!(table.schema().has_sales);
        assert_eq!(table.rows()[0].sales, Some(10.0));
        assert_eq!(table.regions(), vec!["Canada"]);
    }

    #[test]
    fn test_header_only() {
        let table = ShipmentTable::from_reader("Order Region,Sales\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert!(table.schema().has_region);
    }

    #[test]
    fn test_region_filter() {
        let t = table(vec![
            row("Canada", "Late delivery", 1.0),
            row("Oceania", "Late delivery", 2.0),
            row("Canada", "Shipping on time", 3.0),
            row("Caribbean", "Shipping on time", 4.0),
            row("US Center", "Shipping on time", 5.0),
        ]);

        assert_eq!(t.regions(), vec!["Canada", "Oceania", "Caribbean", "US Center"]);
        assert_eq!(t.default_selection(), vec!["Canada", "Oceania", "Caribbean"]);

        let filtered = t.filter_regions(&["Canada".to_string()]);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.rows().iter().all(|r| r.region.as_deref() == Some("Canada")));

        assert_eq!(t.filter_regions(&[]).len(), 5);
        assert_eq!(t.filter_regions(&["Nowhere".to_string()]).len(), 0);
    }
}
