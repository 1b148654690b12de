//! Apportions a total condominium expense to a single unit.
//!
//! [`calculate`] is the pure lookup. [`Calculator`] wraps it with the input
//! state of an interactive session and applies the configured
//! [`Recalculation`] policy.

use crate::core::form::FieldError;
use crate::core::fraction::FractionTable;
use crate::core::money::{format_amount, normalize_location, parse_amount, round_cents};
use crate::core::unit::UnitType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::debug;

/// When the calculator recomputes its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recalculation {
    /// Every input change recomputes.
    #[default]
    Reactive,
    /// Only an explicit submit recomputes.
    OnSubmit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationInput {
    pub unit_type: UnitType,
    pub location: String,
    pub total_amount: String,
}

impl CalculationInput {
    pub fn new(unit_type: UnitType, location: &str, total_amount: &str) -> Self {
        Self {
            unit_type,
            location: location.to_string(),
            total_amount: total_amount.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputErrors {
    pub location: Option<FieldError>,
    pub total_amount: Option<FieldError>,
}

impl InputErrors {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.total_amount.is_none()
    }

    /// True when something was typed that cannot be used, as opposed to a
    /// field simply not being filled in yet.
    pub fn has_invalid(&self) -> bool {
        matches!(self.location, Some(FieldError::Invalid(_)))
            || matches!(self.total_amount, Some(FieldError::Invalid(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateioResult {
    pub unit_type: UnitType,
    pub location: String,
    pub fraction: Decimal,
    pub total_amount: Decimal,
    pub amount_due: Decimal,
}

impl RateioResult {
    /// Amount due in `1.234,56` form.
    pub fn formatted(&self) -> String {
        format_amount(self.amount_due)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    UnknownUnit,
    UnusableFraction,
}

impl Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnresolvedReason::UnknownUnit => write!(f, "no fraction registered for this unit"),
            UnresolvedReason::UnusableFraction => {
                write!(f, "the registered fraction for this unit is not usable")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalculatorState {
    /// Input incomplete or invalid.
    Idle(InputErrors),
    Resolved(RateioResult),
    /// Input is valid but no usable record matches it.
    Unresolved {
        unit_type: UnitType,
        location: String,
        reason: UnresolvedReason,
    },
}

impl CalculatorState {
    pub fn idle() -> Self {
        CalculatorState::Idle(InputErrors::default())
    }

    pub fn result(&self) -> Option<&RateioResult> {
        match self {
            CalculatorState::Resolved(result) => Some(result),
            _ => None,
        }
    }
}

/// Resolves one unit's share of `input.total_amount`.
pub fn calculate(table: &FractionTable, input: &CalculationInput) -> CalculatorState {
    let mut errors = InputErrors::default();

    let location = match normalize_location(&input.location) {
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

    let total_amount = match parse_amount(&input.total_amount) {
        Ok(Some(amount)) => Some(amount),
        Ok(None) => {
            errors.total_amount = Some(FieldError::Missing);
            None
        }
        Err(e) => {
            errors.total_amount = Some(FieldError::Invalid(e.to_string()));
            None
        }
    };

    let (Some(location), Some(total_amount)) = (location, total_amount) else {
        return CalculatorState::Idle(errors);
    };

    let Some(record) = table.lookup(input.unit_type, &location) else {
        debug!(%location, unit_type = %input.unit_type, "No fraction matches unit");
        return CalculatorState::Unresolved {
            unit_type: input.unit_type,
            location,
            reason: UnresolvedReason::UnknownUnit,
        };
    };

    let Some(fraction) = record.usable_fraction() else {
        debug!(%location, fraction = ?record.fraction, "Matched fraction is not usable");
        return CalculatorState::Unresolved {
            unit_type: input.unit_type,
            location,
            reason: UnresolvedReason::UnusableFraction,
        };
    };

    let Some(amount_due) = total_amount.checked_mul(fraction) else {
        errors.total_amount = Some(FieldError::Invalid("amount is too large".to_string()));
        return CalculatorState::Idle(errors);
    };

    CalculatorState::Resolved(RateioResult {
        unit_type: input.unit_type,
        location,
        fraction,
        total_amount,
        amount_due: round_cents(amount_due),
    })
}

/// Interactive calculator over a fetched table.
pub struct Calculator<'a> {
    table: &'a FractionTable,
    policy: Recalculation,
    input: CalculationInput,
    state: CalculatorState,
}

impl<'a> Calculator<'a> {
    pub fn new(table: &'a FractionTable, policy: Recalculation, unit_type: UnitType) -> Self {
        Self {
            table,
            policy,
            input: CalculationInput {
                unit_type,
                ..Default::default()
            },
            state: CalculatorState::idle(),
        }
    }

    pub fn policy(&self) -> Recalculation {
        self.policy
    }

    pub fn input(&self) -> &CalculationInput {
        &self.input
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    pub fn set_unit_type(&mut self, unit_type: UnitType) -> &CalculatorState {
        self.input.unit_type = unit_type;
        self.on_change()
    }

    pub fn set_location(&mut self, location: &str) -> &CalculatorState {
        self.input.location = location.to_string();
        self.on_change()
    }

    pub fn set_total_amount(&mut self, total_amount: &str) -> &CalculatorState {
        self.input.total_amount = total_amount.to_string();
        self.on_change()
    }

    /// Recomputes regardless of policy.
    pub fn submit(&mut self) -> &CalculatorState {
        self.state = calculate(self.table, &self.input);
        &self.state
    }

    fn on_change(&mut self) -> &CalculatorState {
        match self.policy {
            Recalculation::Reactive => self.submit(),
            Recalculation::OnSubmit => {
                self.state = CalculatorState::idle();
                &self.state
            }
        }
    }
}
