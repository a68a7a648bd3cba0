//! Region to distribution-centre coordinates
//! Maps an order region label to the origin point used for flow arcs

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::GeoPoint;

/// Origin for any region not in the table (New York harbour)
pub const DEFAULT_ORIGIN: GeoPoint = GeoPoint::new(40.71, -74.00);

/// Regional distribution centres: region label -> origin point
pub static REGION_ORIGINS: LazyLock<HashMap<&'static str, GeoPoint>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Asia & Oceania
    m.insert("Southeast Asia", GeoPoint::new(13.75, 100.50));
    m.insert("South Asia", GeoPoint::new(20.59, 78.96));
    m.insert("Oceania", GeoPoint::new(-25.27, 133.77));
    m.insert("Eastern Asia", GeoPoint::new(35.86, 104.19));
    m.insert("West Asia", GeoPoint::new(32.42, 53.68));

    // North America
    m.insert("West of USA", GeoPoint::new(36.77, -119.41));
    m.insert("US Center", GeoPoint::new(37.09, -95.71));
    m.insert("East of USA", GeoPoint::new(40.71, -74.00));
    m.insert("Canada", GeoPoint::new(56.13, -106.34));

    // Africa
    m.insert("West Africa", GeoPoint::new(9.08, 8.67));
    m.insert("Central Africa", GeoPoint::new(6.61, 20.93));
    m.insert("North Africa", GeoPoint::new(26.01, 32.27));

    // Europe
    m.insert("Western Europe", GeoPoint::new(46.22, 2.21));
    m.insert("Northern Europe", GeoPoint::new(60.47, 8.46));
    m.insert("Southern Europe", GeoPoint::new(41.87, 12.56));

    // Latin America
    m.insert("Caribbean", GeoPoint::new(21.46, -78.65));
    m.insert("South America", GeoPoint::new(-14.23, -51.92));
    m.insert("Central America", GeoPoint::new(12.76, -85.20));

    m
});

/// Origin point for a region; unknown labels share [`DEFAULT_ORIGIN`].
pub fn resolve(region: &str) -> GeoPoint {
    REGION_ORIGINS.get(region).copied().unwrap_or(DEFAULT_ORIGIN)
}

pub fn is_known(region: &str) -> bool {
    REGION_ORIGINS.contains_key(region)
}

/// Region labels with a dedicated origin, sorted
pub fn known_regions() -> Vec<&'static str> {
    let mut regions: Vec<&'static str> = REGION_ORIGINS.keys().copied().collect();
    regions.sort_unstable();
    regions
}
