//! Fraction records and the in-memory lookup table the calculator reads.

use crate::core::unit::UnitType;
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

/// One unit's share of the condominium expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct FractionRecord {
    pub id: Option<u64>,
    pub location: String,
    pub unit_type: UnitType,
    /// `None` when the upstream value could not be read as a number.
    pub fraction: Option<Decimal>,
}

impl FractionRecord {
    pub fn new(location: &str, unit_type: UnitType, fraction: Decimal) -> Self {
        Self {
            id: None,
            location: location.to_string(),
            unit_type,
            fraction: Some(fraction),
        }
    }

    /// The coefficient, if it can take part in a calculation.
    pub fn usable_fraction(&self) -> Option<Decimal> {
        self.fraction.filter(|f| *f > Decimal::ZERO)
    }
}

/// Immutable view over the fetched records, indexed by `(type, location)`.
#[derive(Debug, Clone, Default)]
pub struct FractionTable {
    records: Vec<FractionRecord>,
    index: HashMap<(UnitType, String), usize>,
}

impl FractionTable {
    pub fn new(records: Vec<FractionRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let key = (record.unit_type, record.location.clone());
            if index.contains_key(&key) {
                debug!(
                    location = %record.location,
                    unit_type = %record.unit_type,
                    "Duplicate fraction record ignored"
                );
                continue;
            }
            index.insert(key, position);
        }
        Self { records, index }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Exact match on an already normalized location.
    pub fn lookup(&self, unit_type: UnitType, location: &str) -> Option<&FractionRecord> {
        self.index
            .get(&(unit_type, location.to_string()))
            .map(|&position| &self.records[position])
    }

    pub fn records(&self) -> &[FractionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
pub trait FractionProvider: Send + Sync {
    async fn fetch_fractions(&self) -> Result<Vec<FractionRecord>>;
}

/// Fetches the table once. A failed fetch yields an empty table so every
/// later lookup resolves to "no match" instead of failing.
pub async fn load_table(provider: &(dyn FractionProvider + Send + Sync)) -> FractionTable {
    match provider.fetch_fractions().await {
        Ok(records) => {
            debug!(count = records.len(), "Loaded fraction table");
            FractionTable::new(records)
        }
        Err(e) => {
            warn!(error = %e, "Fraction table unavailable, lookups will not match");
            FractionTable::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct StaticProvider(Result<Vec<FractionRecord>, String>);

    #[async_trait]
    impl FractionProvider for StaticProvider {
        async fn fetch_fractions(&self) -> Result<Vec<FractionRecord>> {
            self.0.clone().map_err(|e| anyhow!(e))
        }
    }

    #[test]
    fn test_lookup_matches_type_and_location() {
        let table = FractionTable::new(vec![
            FractionRecord::new("08", UnitType::Apartment, dec("0.015")),
            FractionRecord::new("08", UnitType::Store, dec("0.030")),
        ]);

        let apto = table.lookup(UnitType::Apartment, "08").unwrap();
        assert_eq!(apto.fraction, Some(dec("0.015")));
        let loja = table.lookup(UnitType::Store, "08").unwrap();
        assert_eq!(loja.fraction, Some(dec("0.030")));
        assert!(table.lookup(UnitType::Box, "08").is_none());
        assert!(table.lookup(UnitType::Apartment, "8").is_none());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let table = FractionTable::new(vec![
            FractionRecord::new("01", UnitType::Apartment, dec("0.1")),
            FractionRecord::new("01", UnitType::Apartment, dec("0.2")),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup(UnitType::Apartment, "01").unwrap().fraction,
            Some(dec("0.1"))
        );
    }

    #[test]
    fn test_usable_fraction_rejects_zero_and_missing() {
        let mut record = FractionRecord::new("01", UnitType::Apartment, Decimal::ZERO);
        assert!(record.usable_fraction().is_none());
        record.fraction = None;
        assert!(record.usable_fraction().is_none());
        record.fraction = Some(dec("0.5"));
        assert_eq!(record.usable_fraction(), Some(dec("0.5")));
    }

    #[tokio::test]
    async fn test_load_table_degrades_to_empty_on_failure() {
        let provider = StaticProvider(Err("connection refused".to_string()));
        let table = load_table(&provider).await;
        assert!(table.is_empty());
        assert!(table.lookup(UnitType::Apartment, "08").is_none());
    }

    #[tokio::test]
    async fn test_load_table_indexes_fetched_records() {
        let provider = StaticProvider(Ok(vec![FractionRecord::new(
            "08",
            UnitType::Apartment,
            dec("0.015"),
        )]));
        let table = load_table(&provider).await;
        assert_eq!(table.len(), 1);
        assert!(table.lookup(UnitType::Apartment, "08").is_some());
    }
}
