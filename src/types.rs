// Domain types for the vehicle catalog
// The catalog is a two-level tree: category name -> type name -> vehicle list.
// IndexMap keeps the key order of the persisted JSON object intact across
// load/persist cycles.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type name -> ordered list of vehicles.
pub type VehicleGroup = IndexMap<String, Vec<Vehicle>>;

/// Category name -> vehicle groups. The full persisted tree.
pub type Catalog = IndexMap<String, VehicleGroup>;

/// A single vehicle record.
///
/// `name` and `description` are required. `release_year` is kept as a raw
/// JSON value because persisted datasets are not guaranteed to carry a clean
/// number there; year lookups treat anything non-numeric as never matching.
/// Unknown attributes round-trip unchanged through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub name: String,
    pub description: String,
    #[serde(rename = "releaseYear", default, skip_serializing_if = "Value::is_null")]
    pub release_year: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Vehicle {
    /// Case-insensitive name comparison, the uniqueness rule within a
    /// (category, type) pair.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// The vehicle's release year under parseInt semantics, if it has one.
    pub fn release_year_int(&self) -> Option<i64> {
        match &self.release_year {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => parse_year(s),
            _ => None,
        }
    }
}

/// Parse a year the way `parseInt` does: skip leading whitespace, take an
/// optional sign and the leading run of digits, ignore the rest. Returns
/// `None` when no digits lead the string.
pub fn parse_year(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|v| sign * v)
}
