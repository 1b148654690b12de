//! Admin form state for creating and editing fraction records.

use crate::core::fraction::FractionRecord;
use crate::core::money::{format_fraction, normalize_location, parse_fraction};
use crate::core::unit::UnitType;
use rust_decimal::Decimal;
use std::fmt::Display;

/// Problem with a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Missing,
    Invalid(String),
}

impl Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Missing => write!(f, "required"),
            FieldError::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

/// Raw user input, one string per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FractionForm {
    pub location: String,
    pub unit_type: String,
    pub fraction: String,
}

/// A validated record ready to be sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFraction {
    pub location: String,
    pub unit_type: UnitType,
    pub fraction: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub location: Option<FieldError>,
    pub unit_type: Option<FieldError>,
    pub fraction: Option<FieldError>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.unit_type.is_none() && self.fraction.is_none()
    }

    /// `(field name, error)` pairs for display.
    pub fn entries(&self) -> Vec<(&'static str, &FieldError)> {
        [
            ("location", self.location.as_ref()),
            ("type", self.unit_type.as_ref()),
            ("fraction", self.fraction.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, err)| err.map(|e| (name, e)))
        .collect()
    }
}

impl Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .entries()
            .into_iter()
            .map(|(name, err)| format!("{name}: {err}"))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValidation {
    Valid(NewFraction),
    Invalid(FormErrors),
}

impl FractionForm {
    /// Prefills the form from an existing record, as the edit page does.
    pub fn from_record(record: &FractionRecord) -> Self {
        Self {
            location: record.location.clone(),
            unit_type: record.unit_type.code().to_string(),
            fraction: record.fraction.map(format_fraction).unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> FormValidation {
        let mut errors = FormErrors::default();

        let location = match normalize_location(&self.location) {
            Ok(Some(location)) => Some(location),
            Ok(None) => {
                errors.location = Some(FieldError::Missing);
                None
            }
            Err(e) => {
                errors.location = Some(FieldError::Invalid(e.to_string()));
                None
            }
        };

        let unit_type = if self.unit_type.trim().is_empty() {
            errors.unit_type = Some(FieldError::Missing);
            None
        } else {
            match self.unit_type.parse::<UnitType>() {
                Ok(t) => Some(t),
                Err(e) => {
                    errors.unit_type = Some(FieldError::Invalid(e.to_string()));
                    None
                }
            }
        };

        let fraction = if self.fraction.trim().is_empty() {
            errors.fraction = Some(FieldError::Missing);
            None
        } else {
            match parse_fraction(&self.fraction) {
                Some(f) if f > Decimal::ZERO && f <= Decimal::ONE => Some(f),
                Some(_) => {
                    errors.fraction = Some(FieldError::Invalid(
                        "fraction must be greater than 0 and at most 1".to_string(),
                    ));
                    None
                }
                None => {
                    errors.fraction = Some(FieldError::Invalid(format!(
                        "'{}' is not a number",
                        self.fraction.trim()
                    )));
                    None
                }
            }
        };

        match (location, unit_type, fraction) {
            (Some(location), Some(unit_type), Some(fraction)) => {
                FormValidation::Valid(NewFraction {
                    location,
                    unit_type,
                    fraction,
                })
            }
            _ => FormValidation::Invalid(errors),
        }
    }
}
