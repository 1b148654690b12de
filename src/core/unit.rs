use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Kind of unit a fraction belongs to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum UnitType {
    #[default]
    #[serde(rename = "APTO")]
    Apartment,
    #[serde(rename = "LOJA")]
    Store,
    #[serde(rename = "BOX")]
    Box,
}

impl UnitType {
    /// Code used by the API.
    pub fn code(&self) -> &'static str {
        match self {
            UnitType::Apartment => "APTO",
            UnitType::Store => "LOJA",
            UnitType::Box => "BOX",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            UnitType::Apartment => "Apartamento",
            UnitType::Store => "Loja",
            UnitType::Box => "Box",
        }
    }
}

impl Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for UnitType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "APTO" | "APARTAMENTO" | "APARTMENT" => Ok(UnitType::Apartment),
            "LOJA" | "STORE" => Ok(UnitType::Store),
            "BOX" => Ok(UnitType::Box),
            _ => Err(anyhow::anyhow!("Invalid unit type: {}", s)),
        }
    }
}
