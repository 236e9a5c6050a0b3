//! Inventory-side domain types: storage locations, image formats, detected and stored items.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::GatewayError;

/// Quantity reported to the planner when the stored item has none.
pub const UNKNOWN_QUANTITY: &str = "unknown";

/// Timestamp layout used by the inventory store (`datetime('now')`).
pub const STORE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Pantry,
    #[default]
    Fridge,
    Freezer,
}

impl Location {
    pub const ALL: [Self; 3] = [Self::Pantry, Self::Fridge, Self::Freezer];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pantry => "pantry",
            Self::Fridge => "fridge",
            Self::Freezer => "freezer",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                GatewayError::InvalidInput(format!(
                    "unknown location '{wanted}', expected pantry, fridge or freezer"
                ))
            })
    }
}

/// Image formats both backends accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMime {
    #[default]
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
    #[serde(rename = "image/gif")]
    Gif,
}

impl ImageMime {
    pub const ALL: [Self; 4] = [Self::Jpeg, Self::Png, Self::Webp, Self::Gif];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Guess from a file extension, falling back to JPEG.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Self::Png,
            Some("webp") => Self::Webp,
            Some("gif") => Self::Gif,
            _ => Self::Jpeg,
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageMime {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GatewayError::InvalidInput(format!("unsupported image type '{wanted}'")))
    }
}

/// An item the vision model reported. Not stored until the user confirms it.
///
/// Models are loose with types here, so numbers and booleans are kept as
/// their text and `null` reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedItem {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub quantity: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub expiry_estimate: String,
}

impl DetectedItem {
    /// Build the stored record for a confirmed detection.
    #[must_use]
    pub fn into_inventory(
        self,
        location: Location,
        id: i64,
        added_at: DateTime<Utc>,
    ) -> InventoryItem {
        InventoryItem {
            id,
            name: self.name,
            category: location,
            quantity: Some(self.quantity).filter(|q| !q.trim().is_empty()),
            added_at: added_at.format(STORE_DATETIME_FORMAT).to_string(),
            expiry_estimate: Some(self.expiry_estimate).filter(|e| !e.trim().is_empty()),
            notes: None,
        }
    }
}

/// Inventory record as exchanged with the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub category: Location,
    #[serde(default)]
    pub quantity: Option<String>,
    pub added_at: String,
    #[serde(default)]
    pub expiry_estimate: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One line of the inventory snapshot handed to the meal planner.
///
/// Deserializes from stored items as well: unknown fields are ignored and a
/// missing, null or blank quantity becomes [`UNKNOWN_QUANTITY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLine {
    pub name: String,
    #[serde(
        default = "unknown_quantity",
        deserialize_with = "quantity_or_unknown"
    )]
    pub quantity: String,
    pub category: Location,
}

impl InventoryLine {
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: Option<&str>, category: Location) -> Self {
        Self {
            name: name.into(),
            quantity: quantity
                .filter(|q| !q.trim().is_empty())
                .unwrap_or(UNKNOWN_QUANTITY)
                .to_owned(),
            category,
        }
    }
}

impl From<&InventoryItem> for InventoryLine {
    fn from(item: &InventoryItem) -> Self {
        Self::new(item.name.clone(), item.quantity.as_deref(), item.category)
    }
}

fn unknown_quantity() -> String {
    UNKNOWN_QUANTITY.to_owned()
}

fn quantity_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = lenient_text(deserializer)?;
    if raw.trim().is_empty() {
        Ok(unknown_quantity())
    } else {
        Ok(raw)
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn location_parses_case_insensitively() {
        assert_eq!("Pantry".parse::<Location>().unwrap(), Location::Pantry);
        assert_eq!(" FREEZER ".parse::<Location>().unwrap(), Location::Freezer);
        assert_eq!(Location::default(), Location::Fridge);
    }

    #[test]
    fn unknown_location_is_client_error() {
        let err = "garage".parse::<Location>().unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("garage"));
    }

    #[test]
    fn location_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Location::Freezer).unwrap(),
            "\"freezer\""
        );
    }

    #[test]
    fn mime_parses_supported_types_only() {
        assert_eq!("image/webp".parse::<ImageMime>().unwrap(), ImageMime::Webp);
        assert_eq!("IMAGE/PNG".parse::<ImageMime>().unwrap(), ImageMime::Png);
        assert!("image/tiff".parse::<ImageMime>().unwrap_err().is_client_error());
    }

    #[test]
    fn mime_guessed_from_extension() {
        assert_eq!(ImageMime::from_path(Path::new("a/fridge.PNG")), ImageMime::Png);
        assert_eq!(ImageMime::from_path(Path::new("shelf.gif")), ImageMime::Gif);
        assert_eq!(ImageMime::from_path(Path::new("shelf.jpg")), ImageMime::Jpeg);
        assert_eq!(ImageMime::from_path(Path::new("shelf")), ImageMime::Jpeg);
        assert_eq!(ImageMime::from_path(Path::new("shelf.heic")), ImageMime::Jpeg);
    }

    #[test]
    fn detected_item_tolerates_missing_fields() {
        let item: DetectedItem = serde_json::from_str(r#"{"name":"Butter"}"#).unwrap();
        assert_eq!(item.name, "Butter");
        assert!(item.quantity.is_empty());
        assert!(serde_json::from_str::<DetectedItem>(r#"{"quantity":"1"}"#).is_err());
    }

    #[test]
    fn detected_item_accepts_null_and_numbers() {
        let items: Vec<DetectedItem> = serde_json::from_str(
            r#"[{"name":"Eggs","quantity":8,"expiry_estimate":"2 weeks"},
                {"name":"Rice","quantity":"1 bag","expiry_estimate":null},
                {"name":"Olive oil","quantity":0.5,"expiry_estimate":false}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].quantity, "8");
        assert!(items[1].expiry_estimate.is_empty());
        assert_eq!(items[2].quantity, "0.5");
        assert_eq!(items[2].expiry_estimate, "false");
    }

    #[test]
    fn inventory_line_numeric_quantity_is_text() {
        let line: InventoryLine =
            serde_json::from_str(r#"{"name":"Eggs","quantity":12,"category":"fridge"}"#).unwrap();
        assert_eq!(line.quantity, "12");
    }

    #[test]
    fn confirmed_detection_becomes_inventory_item() {
        let added = Utc.with_ymd_and_hms(2025, 3, 4, 18, 30, 0).unwrap();
        let item = DetectedItem {
            name: "Milk".into(),
            quantity: "1 gal".into(),
            expiry_estimate: String::new(),
        }
        .into_inventory(Location::Fridge, 7, added);
        assert_eq!(item.id, 7);
        assert_eq!(item.category, Location::Fridge);
        assert_eq!(item.quantity.as_deref(), Some("1 gal"));
        assert!(item.expiry_estimate.is_none());
        assert_eq!(item.added_at, "2025-03-04 18:30:00");
    }

    #[test]
    fn inventory_line_defaults_quantity_to_unknown() {
        let stored = InventoryItem {
            id: 1,
            name: "Rice".into(),
            category: Location::Pantry,
            quantity: None,
            added_at: "2025-03-04 18:30:00".into(),
            expiry_estimate: None,
            notes: None,
        };
        let line = InventoryLine::from(&stored);
        assert_eq!(line.quantity, UNKNOWN_QUANTITY);
        assert_eq!(line.category, Location::Pantry);
    }

    #[test]
    fn inventory_line_reads_stored_item_json() {
        let json = r#"[
            {"id":1,"name":"Rice","category":"pantry","quantity":null,"addedAt":"2025-03-04 18:30:00"},
            {"id":2,"name":"Peas","category":"freezer","quantity":"1 bag"},
            {"name":"Eggs","category":"fridge"}
        ]"#;
        let lines: Vec<InventoryLine> = serde_json::from_str(json).unwrap();
        assert_eq!(lines[0].quantity, UNKNOWN_QUANTITY);
        assert_eq!(lines[1].quantity, "1 bag");
        assert_eq!(lines[2].quantity, UNKNOWN_QUANTITY);
    }

    #[test]
    fn inventory_item_uses_camel_case() {
        let json = serde_json::to_value(InventoryItem {
            id: 3,
            name: "Jam".into(),
            category: Location::Pantry,
            quantity: None,
            added_at: "2025-01-01 00:00:00".into(),
            expiry_estimate: Some("2 months".into()),
            notes: None,
        })
        .unwrap();
        assert_eq!(json["addedAt"], "2025-01-01 00:00:00");
        assert_eq!(json["expiryEstimate"], "2 months");
    }
}
