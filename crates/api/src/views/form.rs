use priceopt_core::intake::{FieldErrors, RawIntake, MAX_BATHS, MAX_BEDS, MAX_CONDITION, MIN_CONDITION, MIN_SQFT};
use priceopt_core::types::{PropertyType, Tenure};
use serde::Serialize;

/// Intake form as rendered: current values, per-field messages and an
/// optional submission failure banner.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub inputs: Vec<InputField>,
    pub selects: Vec<SelectField>,
    /// Set when the estimation service rejected or failed the submission.
    pub submit_error: Option<&'static str>,
    pub error_count: usize,
}

#[derive(Debug, Serialize)]
pub struct InputField {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub value: String,
    pub error: Option<String>,
    pub autocomplete: Option<&'static str>,
    pub inputmode: Option<&'static str>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub step: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SelectField {
    pub name: &'static str,
    pub label: &'static str,
    pub options: Vec<SelectOption>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl InputField {
    fn text(name: &'static str, label: &'static str, value: &str, errors: &FieldErrors) -> Self {
        Self {
            name,
            label,
            input_type: "text",
            value: value.to_string(),
            error: errors.get(name).map(str::to_string),
            autocomplete: None,
            inputmode: None,
            min: None,
            max: None,
            step: None,
        }
    }

    fn number(
        name: &'static str,
        label: &'static str,
        value: &str,
        errors: &FieldErrors,
        (min, max, step): (String, Option<String>, &'static str),
    ) -> Self {
        Self {
            input_type: "number",
            inputmode: Some(if step == "1" { "numeric" } else { "decimal" }),
            min: Some(min),
            max,
            step: Some(step),
            ..Self::text(name, label, value, errors)
        }
    }

    fn autocomplete(mut self, token: &'static str) -> Self {
        self.autocomplete = Some(token);
        self
    }
}

impl FormView {
    pub fn new(values: &RawIntake, errors: &FieldErrors) -> Self {
        let inputs = vec![
            InputField::text("address", "Street address", &values.address, errors)
                .autocomplete("street-address"),
            InputField::text("city", "City", &values.city, errors).autocomplete("address-level2"),
            InputField::text("state", "State", &values.state, errors).autocomplete("address-level1"),
            InputField::text("zip", "ZIP", &values.zip, errors).autocomplete("postal-code"),
            InputField::number(
                "beds",
                "Beds",
                &values.beds,
                errors,
                ("0".into(), Some(MAX_BEDS.to_string()), "1"),
            ),
            InputField::number(
                "baths",
                "Baths",
                &values.baths,
                errors,
                ("0".into(), Some(MAX_BATHS.to_string()), "0.5"),
            ),
            InputField::number("sqft", "Sqft", &values.sqft, errors, (MIN_SQFT.to_string(), None, "1")),
            InputField::number(
                "condition",
                "Condition (1-5)",
                &values.condition,
                errors,
                (MIN_CONDITION.to_string(), Some(MAX_CONDITION.to_string()), "1"),
            ),
        ];

        let selects = vec![
            SelectField {
                name: "type",
                label: "Type",
                options: PropertyType::ALL
                    .iter()
                    .map(|t| SelectOption {
                        value: t.as_str(),
                        label: t.label(),
                        selected: values.property_type == t.as_str(),
                    })
                    .collect(),
                error: errors.get("type").map(str::to_string),
            },
            SelectField {
                name: "tenure",
                label: "Tenure",
                options: Tenure::ALL
                    .iter()
                    .map(|t| SelectOption {
                        value: t.as_str(),
                        label: t.label(),
                        selected: values.tenure == t.as_str(),
                    })
                    .collect(),
                error: errors.get("tenure").map(str::to_string),
            },
        ];

        Self {
            inputs,
            selects,
            submit_error: None,
            error_count: errors.len(),
        }
    }

    pub fn with_submit_error(mut self, message: &'static str) -> Self {
        self.submit_error = Some(message);
        self
    }
}
