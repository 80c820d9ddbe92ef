//! Store-location record
//!
//! Every record carries exactly 18 string fields. Serialization emits them in
//! declaration order, which is the canonical order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical field order for every record leaving the service
pub const FIELD_NAMES: [&str; 18] = [
    "id", "name", "lat", "lng", "category", "address", "address2", "city", "state", "postal",
    "phone", "web", "hours1", "hours2", "hours3", "featured", "features", "date",
];

/// Value written to `featured` when the input leaves it empty
pub const FEATURED_DEFAULT: &str = "no";

/// One store location
///
/// Field order here defines output order; keep it in sync with [`FIELD_NAMES`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationRecord {
    pub id: String,
    pub name: String,
    pub lat: String,
    pub lng: String,
    pub category: String,
    pub address: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub postal: String,
    pub phone: String,
    pub web: String,
    pub hours1: String,
    pub hours2: String,
    pub hours3: String,
    pub featured: String,
    pub features: String,
    pub date: String,
}

impl LocationRecord {
    /// Build a record from a loosely-typed JSON object
    ///
    /// Missing fields become empty strings and unknown keys are dropped.
    /// Non-string scalars are rendered as their JSON text (`5` → `"5"`),
    /// `null` becomes `""`, and nested values are kept as compact JSON.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut record = Self::default();
        for name in FIELD_NAMES {
            if let Some(value) = object.get(name) {
                if let Some(slot) = record.field_mut(name) {
                    *slot = value_to_field(value);
                }
            }
        }
        record
    }

    /// Read a field by its canonical name
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "id" => &self.id,
            "name" => &self.name,
            "lat" => &self.lat,
            "lng" => &self.lng,
            "category" => &self.category,
            "address" => &self.address,
            "address2" => &self.address2,
            "city" => &self.city,
            "state" => &self.state,
            "postal" => &self.postal,
            "phone" => &self.phone,
            "web" => &self.web,
            "hours1" => &self.hours1,
            "hours2" => &self.hours2,
            "hours3" => &self.hours3,
            "featured" => &self.featured,
            "features" => &self.features,
            "date" => &self.date,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        let slot = match name {
            "id" => &mut self.id,
            "name" => &mut self.name,
            "lat" => &mut self.lat,
            "lng" => &mut self.lng,
            "category" => &mut self.category,
            "address" => &mut self.address,
            "address2" => &mut self.address2,
            "city" => &mut self.city,
            "state" => &mut self.state,
            "postal" => &mut self.postal,
            "phone" => &mut self.phone,
            "web" => &mut self.web,
            "hours1" => &mut self.hours1,
            "hours2" => &mut self.hours2,
            "hours3" => &mut self.hours3,
            "featured" => &mut self.featured,
            "features" => &mut self.features,
            "date" => &mut self.date,
            _ => return None,
        };
        Some(slot)
    }

    /// True when both coordinates are present
    pub fn has_coordinates(&self) -> bool {
        !self.lat.is_empty() && !self.lng.is_empty()
    }

    /// Apply output defaults (`featured` → `"no"` when empty)
    pub fn finalize(&mut self) {
        if self.featured.is_empty() {
            self.featured = FEATURED_DEFAULT.to_string();
        }
    }

    /// Name for log lines and status text
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown"
        } else {
            &self.name
        }
    }
}

fn value_to_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Render a coordinate as a decimal string, rounded to 10 places
///
/// Always contains a decimal point (`30` → `"30.0"`).
pub fn format_coordinate(value: f64) -> String {
    let rounded = (value * 1e10).round() / 1e10;
    let text = rounded.to_string();
    if text.contains('.') || text.contains("inf") || text.contains("NaN") {
        text
    } else {
        format!("{}.0", text)
    }
}
