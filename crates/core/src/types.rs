//! Wire types shared with the external estimation service.
//!
//! [`EstimateRequest`] is what the intake form submits; [`EstimateResult`]
//! and [`Comp`] are read back when showing results or rendering a report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Address shown in place of the primary comp's address when an estimate
/// came back without comparables.
pub const PLACEHOLDER_ADDRESS: &str = "property";

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Kind of dwelling being estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    Condo,
    SingleFamily,
    Townhome,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Apartment,
        PropertyType::Condo,
        PropertyType::SingleFamily,
        PropertyType::Townhome,
    ];

    /// Wire value, as used in form controls and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::Condo => "condo",
            PropertyType::SingleFamily => "single_family",
            PropertyType::Townhome => "townhome",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PropertyType::Apartment => "Apartment",
            PropertyType::Condo => "Condo",
            PropertyType::SingleFamily => "Single Family",
            PropertyType::Townhome => "Townhome",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

/// Whether the estimate is for rental or sale pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenure {
    Rent,
    Sale,
}

impl Tenure {
    pub const ALL: [Tenure; 2] = [Tenure::Rent, Tenure::Sale];

    pub fn as_str(self) -> &'static str {
        match self {
            Tenure::Rent => "rent",
            Tenure::Sale => "sale",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tenure::Rent => "Rent",
            Tenure::Sale => "Sale",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

/// Coarse reliability indicator attached to an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// Badge text, e.g. `High Confidence`.
    pub fn badge_label(self) -> &'static str {
        match self {
            Confidence::Low => "Low Confidence",
            Confidence::Medium => "Medium Confidence",
            Confidence::High => "High Confidence",
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSpec {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub beds: i64,
    pub baths: f64,
    pub sqft: i64,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub condition: i64,
    pub tenure: Tenure,
}

/// Normalized body of `POST /estimate`.
///
/// Only constructed through [`crate::intake::RawIntake::validate`], so every
/// instance satisfies the intake invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub address: AddressSpec,
    pub property: PropertySpec,
}

/// The part of the `POST /estimate` response needed for navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateCreated {
    pub id: String,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// A comparable property backing an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comp {
    pub id: String,
    pub address: String,
    pub distance_km: f64,
    pub beds: i64,
    pub baths: f64,
    pub sqft: i64,
    #[serde(default)]
    pub adjusted_price: Option<f64>,
    #[serde(with = "timestamp")]
    pub closed_or_listed_date: Timestamp,
    /// Unadjusted sale/listing price, when the service reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A valuation returned by the estimation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub id: String,
    #[serde(with = "timestamp")]
    pub created_at: Timestamp,
    pub range_low: f64,
    pub range_high: f64,
    pub point_estimate: f64,
    pub confidence: Confidence,
    #[serde(default)]
    pub comps: Vec<Comp>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub adjustments: BTreeMap<String, f64>,
}

impl EstimateResult {
    /// Check the invariants a well-formed result must satisfy:
    /// `range_low <= point_estimate <= range_high` and non-negative comp
    /// distances.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        if !(self.range_low <= self.point_estimate && self.point_estimate <= self.range_high) {
            return Err(CoreError::InvalidPayload(format!(
                "point_estimate {} outside range [{}, {}]",
                self.point_estimate, self.range_low, self.range_high
            )));
        }
        if let Some(comp) = self.comps.iter().find(|c| !(c.distance_km >= 0.0)) {
            return Err(CoreError::InvalidPayload(format!(
                "comp {} has negative distance {}",
                comp.id, comp.distance_km
            )));
        }
        Ok(())
    }

    /// Address of the highest-ranked comp, if any.
    pub fn primary_address(&self) -> Option<&str> {
        self.comps.first().map(|c| c.address.as_str())
    }
}

// ---------------------------------------------------------------------------
// Timestamp (de)serialization
// ---------------------------------------------------------------------------

/// Lenient timestamp format used by the estimation service.
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00Z`), naive ISO date-times
/// (`2024-05-01T12:00:00.123456`, read as UTC) and plain dates
/// (`2024-05-01`, midnight UTC). Always serializes as RFC 3339.
pub mod timestamp {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Timestamp;

    pub fn parse(raw: &str) -> Option<Timestamp> {
        let raw = raw.trim();
        if let Ok(ts) = raw.parse::<Timestamp>() {
            return Some(ts);
        }
        if let Ok(naive) = raw.parse::<NaiveDateTime>() {
            return Some(naive.and_utc());
        }
        raw.parse::<NaiveDate>()
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn result_json(low: f64, point: f64, high: f64) -> serde_json::Value {
        serde_json::json!({
            "id": "est-1",
            "created_at": "2024-05-01T12:30:00.250000",
            "range_low": low,
            "range_high": high,
            "point_estimate": point,
            "confidence": "medium",
            "comps": [{
                "id": "c1",
                "address": "1 Example St",
                "distance_km": 0.42,
                "beds": 2,
                "baths": 1.5,
                "sqft": 850,
                "adjusted_price": 512000.4,
                "closed_or_listed_date": "2024-04-20",
                "price": 500000.0,
                "property_type": "condo",
                "source": "fake"
            }],
            "adjustments": {}
        })
    }

    #[test]
    fn parses_service_payload() {
        let result: EstimateResult =
            serde_json::from_value(result_json(400_000.0, 450_000.0, 500_000.0)).unwrap();

        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(
            result.comps[0].closed_or_listed_date,
            Utc.with_ymd_and_hms(2024, 4, 20, 0, 0, 0).unwrap()
        );
        assert_eq!(result.comps[0].property_type, Some(PropertyType::Condo));
        assert_eq!(result.primary_address(), Some("1 Example St"));
        assert!(result.check_invariants().is_ok());
    }

    #[test]
    fn missing_adjusted_price_is_tolerated() {
        let mut json = result_json(1.0, 2.0, 3.0);
        json["comps"][0]
            .as_object_mut()
            .unwrap()
            .remove("adjusted_price");

        let result: EstimateResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.comps[0].adjusted_price, None);
    }

    #[test]
    fn point_outside_range_is_rejected() {
        let result: EstimateResult =
            serde_json::from_value(result_json(400_000.0, 550_000.0, 500_000.0)).unwrap();
        assert!(matches!(
            result.check_invariants(),
            Err(CoreError::InvalidPayload(_))
        ));
    }

    #[test]
    fn point_on_range_bounds_is_accepted() {
        let result: EstimateResult =
            serde_json::from_value(result_json(10.0, 10.0, 10.0)).unwrap();
        assert!(result.check_invariants().is_ok());
    }

    #[test]
    fn timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(timestamp::parse("2024-05-01T12:00:00Z"), Some(expected));
        assert_eq!(timestamp::parse("2024-05-01T14:00:00+02:00"), Some(expected));
        assert_eq!(timestamp::parse("2024-05-01T12:00:00"), Some(expected));
        assert_eq!(
            timestamp::parse("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(timestamp::parse("yesterday"), None);
    }

    #[test]
    fn request_serializes_type_keyword() {
        let request = EstimateRequest {
            address: AddressSpec {
                street: "123 Main St".into(),
                city: "X".into(),
                state: "CA".into(),
                zip: "12345".into(),
            },
            property: PropertySpec {
                beds: 2,
                baths: 2.5,
                sqft: 900,
                property_type: PropertyType::SingleFamily,
                condition: 3,
                tenure: Tenure::Rent,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["property"]["type"], "single_family");
        assert_eq!(json["property"]["tenure"], "rent");
        assert_eq!(json["address"]["zip"], "12345");
    }

    #[test]
    fn enum_parsing_matches_wire_values() {
        for t in PropertyType::ALL {
            assert_eq!(PropertyType::parse(t.as_str()), Some(t));
        }
        assert_eq!(PropertyType::parse("castle"), None);
        assert_eq!(Tenure::parse("sale"), Some(Tenure::Sale));
        assert_eq!(Tenure::parse("Sale"), None);
    }
}
