//! Regional health-center directory
//!
//! Read-only list bundled with the binary. Keys follow the regional
//! open-data export, hence the Spanish field names.

use serde::{Deserialize, Serialize};
use std::fmt;

const BUNDLED_CENTERS: &str = include_str!("../data/health_centers.json");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCenter {
    #[serde(rename = "Código")]
    pub code: String,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Dirección")]
    pub address: String,
    #[serde(rename = "C.P.", default)]
    pub postal_code: String,
    #[serde(rename = "Municipio")]
    pub municipality: String,
    #[serde(rename = "Teléfono")]
    pub phone: String,
    #[serde(rename = "Latitud")]
    pub latitude: String,
    #[serde(rename = "Longitud")]
    pub longitude: String,
}

impl fmt::Display for HealthCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Municipality: {}, Tel: {})",
            self.name, self.municipality, self.phone
        )
    }
}

/// Parse a directory document
pub fn parse(json: &str) -> Result<Vec<HealthCenter>, serde_json::Error> {
    serde_json::from_str(json)
}

/// The bundled directory. A malformed bundle yields an empty list.
pub fn bundled() -> Vec<HealthCenter> {
    parse(BUNDLED_CENTERS).unwrap_or_else(|e| {
        tracing::error!(error = %e, "bundled health-center list is malformed");
        Vec::new()
    })
}

/// Whether a location mentions the region keyword (case-insensitive)
pub fn location_matches(location: &str, keyword: &str) -> bool {
    let keyword = keyword.trim();
    !keyword.is_empty() && location.to_lowercase().contains(&keyword.to_lowercase())
}

/// Centers whose municipality contains `query` (case-insensitive)
pub fn in_municipality<'a>(centers: &'a [HealthCenter], query: &str) -> Vec<&'a HealthCenter> {
    let query = query.trim().to_lowercase();
    centers
        .iter()
        .filter(|c| c.municipality.to_lowercase().contains(&query))
        .collect()
}
