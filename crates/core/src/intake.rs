//! Intake validation for the estimate form.
//!
//! Form controls deliver strings. [`RawIntake::validate`] coerces the
//! numeric fields, applies the schema and either yields a normalized
//! [`EstimateRequest`] or a field-keyed map of messages. Nothing may be
//! submitted to the estimation service while any message exists.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationErrors};

use crate::types::{AddressSpec, EstimateRequest, PropertySpec, PropertyType, Tenure};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

pub const MIN_BEDS: i64 = 0;
pub const MAX_BEDS: i64 = 12;
pub const MIN_BATHS: f64 = 0.0;
pub const MAX_BATHS: f64 = 10.0;
/// Smallest accepted living area, inclusive.
pub const MIN_SQFT: i64 = 300;
pub const MIN_CONDITION: i64 = 1;
pub const MAX_CONDITION: i64 = 5;

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

/// Human-readable validation messages keyed by form field name.
///
/// Only the first message per field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn merge_validator(&mut self, errors: &ValidationErrors) {
        for (field, errs) in errors.field_errors() {
            if let Some(first) = errs.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {field}"));
                self.add(field.to_string(), message);
            }
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// Unvalidated form state, one string per control.
///
/// Deserializes from `application/x-www-form-urlencoded` bodies and from
/// JSON, where numeric fields may arrive either as strings or as numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawIntake {
    #[serde(deserialize_with = "scalar_string")]
    pub address: String,
    #[serde(deserialize_with = "scalar_string")]
    pub city: String,
    #[serde(deserialize_with = "scalar_string")]
    pub state: String,
    #[serde(deserialize_with = "scalar_string")]
    pub zip: String,
    #[serde(deserialize_with = "scalar_string")]
    pub beds: String,
    #[serde(deserialize_with = "scalar_string")]
    pub baths: String,
    #[serde(deserialize_with = "scalar_string")]
    pub sqft: String,
    #[serde(rename = "type", deserialize_with = "scalar_string")]
    pub property_type: String,
    #[serde(deserialize_with = "scalar_string")]
    pub condition: String,
    #[serde(deserialize_with = "scalar_string")]
    pub tenure: String,
}

/// Schema applied after coercion. Numeric fields are `None` when coercion
/// already failed (and reported its own message).
#[derive(Debug, Validate)]
struct IntakeSchema {
    #[validate(length(min = 3, message = "Address required"))]
    address: String,
    #[validate(length(min = 1, message = "City required"))]
    city: String,
    #[validate(length(min = 2, message = "State required"))]
    state: String,
    #[validate(length(min = 5, max = 10, message = "ZIP must be 5 to 10 characters"))]
    zip: String,
    #[validate(range(min = MIN_BEDS, max = MAX_BEDS, message = "Beds must be between 0 and 12"))]
    beds: Option<i64>,
    #[validate(range(min = MIN_BATHS, max = MAX_BATHS, message = "Baths must be between 0 and 10"))]
    baths: Option<f64>,
    #[validate(range(min = MIN_SQFT, message = "Min 300 sqft"))]
    sqft: Option<i64>,
    #[validate(range(min = MIN_CONDITION, max = MAX_CONDITION, message = "Condition must be between 1 and 5"))]
    condition: Option<i64>,
}

impl RawIntake {
    /// Form state shown before the user has typed anything.
    pub fn with_defaults() -> Self {
        Self {
            beds: "3".into(),
            baths: "2".into(),
            sqft: "1200".into(),
            property_type: PropertyType::Condo.as_str().into(),
            condition: "3".into(),
            tenure: Tenure::Sale.as_str().into(),
            ..Self::default()
        }
    }

    /// Coerce and validate, producing a request ready for submission.
    pub fn validate(&self) -> Result<EstimateRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let beds = coerce_whole(&self.beds, "beds", &mut errors);
        let baths = coerce_number(&self.baths, "baths", &mut errors);
        let sqft = coerce_whole(&self.sqft, "sqft", &mut errors);
        let condition = coerce_whole(&self.condition, "condition", &mut errors);

        let property_type = PropertyType::parse(self.property_type.trim());
        if property_type.is_none() {
            errors.add("type", "Choose a property type");
        }
        let tenure = Tenure::parse(self.tenure.trim());
        if tenure.is_none() {
            errors.add("tenure", "Choose rent or sale");
        }

        let schema = IntakeSchema {
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip: self.zip.trim().to_string(),
            beds,
            baths,
            sqft,
            condition,
        };
        if let Err(e) = schema.validate() {
            errors.merge_validator(&e);
        }
        if let Some(b) = baths {
            if !is_half_step(b) {
                errors.add("baths", "Baths must be in 0.5 steps");
            }
        }

        match (beds, baths, sqft, condition, property_type, tenure) {
            (Some(beds), Some(baths), Some(sqft), Some(condition), Some(property_type), Some(tenure))
                if errors.is_empty() =>
            {
                Ok(EstimateRequest {
                    address: AddressSpec {
                        street: schema.address,
                        city: schema.city,
                        state: schema.state,
                        zip: schema.zip,
                    },
                    property: PropertySpec {
                        beds,
                        baths,
                        sqft,
                        property_type,
                        condition,
                        tenure,
                    },
                })
            }
            _ => Err(errors),
        }
    }
}

/// `true` when `value * 2` is a whole number.
pub fn is_half_step(value: f64) -> bool {
    let doubled = value * 2.0;
    doubled.is_finite() && doubled == doubled.round()
}

fn coerce_number(raw: &str, field: &str, errors: &mut FieldErrors) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, "Required");
        return None;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            errors.add(field, "Must be a number");
            None
        }
    }
}

fn coerce_whole(raw: &str, field: &str, errors: &mut FieldErrors) -> Option<i64> {
    let value = coerce_number(raw, field, errors)?;
    if value.fract() != 0.0 {
        errors.add(field, "Must be a whole number");
        return None;
    }
    Some(value as i64)
}

/// Accept a JSON string, number or boolean (or a form value) as a string.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(f64),
        Flag(bool),
    }

    // `null` counts as an empty field so it reports "Required".
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => String::new(),
        Some(Scalar::Text(s)) => s,
        Some(Scalar::Number(n)) => n.to_string(),
        Some(Scalar::Flag(b)) => b.to_string(),
    })
}
