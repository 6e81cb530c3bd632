//! Consumption ledgers: typed nested maps of quantities.
//!
//! Payloads arrive with string codes; they are parsed into [`FuelType`] and
//! [`Machinery`] before they reach a ledger, so a ledger never holds a key it
//! cannot name.

use std::{collections::BTreeMap, fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Fuel grades a ship may burn or bunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FuelType {
    #[serde(rename = "HFO")]
    HeavyFuelOil,
    #[serde(rename = "LSFO")]
    LowSulphurFuelOil,
    #[serde(rename = "MDO")]
    MarineDieselOil,
    #[serde(rename = "MGO")]
    MarineGasOil,
    #[serde(rename = "LPGP")]
    LpgPropane,
    #[serde(rename = "LPGB")]
    LpgButane,
    #[serde(rename = "METH")]
    Methanol,
    #[serde(rename = "ETH")]
    Ethanol,
    #[serde(rename = "LNG")]
    Lng,
}

impl FuelType {
    pub const ALL: [Self; 9] = [
        Self::HeavyFuelOil,
        Self::LowSulphurFuelOil,
        Self::MarineDieselOil,
        Self::MarineGasOil,
        Self::LpgPropane,
        Self::LpgButane,
        Self::Methanol,
        Self::Ethanol,
        Self::Lng,
    ];

    /// The short code used in reports and storage.
    pub fn code(self) -> &'static str {
        match self {
            Self::HeavyFuelOil => "HFO",
            Self::LowSulphurFuelOil => "LSFO",
            Self::MarineDieselOil => "MDO",
            Self::MarineGasOil => "MGO",
            Self::LpgPropane => "LPGP",
            Self::LpgButane => "LPGB",
            Self::Methanol => "METH",
            Self::Ethanol => "ETH",
            Self::Lng => "LNG",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FuelType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|fuel| fuel.code() == s)
            .ok_or_else(|| DataError::UnknownFuelType(s.to_string()))
    }
}

/// The consumer a breakdown quantity is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Machinery {
    #[serde(rename = "ME")]
    MainEngine,
    #[serde(rename = "AE")]
    AuxiliaryEngine,
    #[serde(rename = "BOILER")]
    Boiler,
    #[serde(rename = "IGG")]
    InertGasGenerator,
    #[serde(rename = "INCINERATOR")]
    Incinerator,
    #[serde(rename = "OTHER")]
    Other,
}

impl Machinery {
    pub const ALL: [Self; 6] = [
        Self::MainEngine,
        Self::AuxiliaryEngine,
        Self::Boiler,
        Self::InertGasGenerator,
        Self::Incinerator,
        Self::Other,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::MainEngine => "ME",
            Self::AuxiliaryEngine => "AE",
            Self::Boiler => "BOILER",
            Self::InertGasGenerator => "IGG",
            Self::Incinerator => "INCINERATOR",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for Machinery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Machinery {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.code() == s)
            .ok_or_else(|| DataError::UnknownMachinery(s.to_string()))
    }
}

/// Per-fuel, per-machinery consumption for one measurement window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuelLedger(pub BTreeMap<FuelType, BTreeMap<Machinery, Decimal>>);

impl FuelLedger {
    /// Quantity recorded for one fuel and consumer, if any.
    pub fn get(&self, fuel: FuelType, machinery: Machinery) -> Option<Decimal> {
        self.0.get(&fuel).and_then(|m| m.get(&machinery)).copied()
    }

    /// Sum over all consumers for one fuel.
    pub fn fuel_total(&self, fuel: FuelType) -> Decimal {
        self.0
            .get(&fuel)
            .map(|m| m.values().copied().sum())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A flat ledger of quantities keyed by a consumable.
///
/// Used both for ROB snapshots (overwrite) and for receipt / debunkering /
/// lube-oil totals (additive); the merge rule lives with the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent, bound(
    serialize = "K: Ord + Serialize",
    deserialize = "K: Ord + Deserialize<'de>"
))]
pub struct QuantityLedger<K>(pub BTreeMap<K, Decimal>);

impl<K> Default for QuantityLedger<K> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<K: Ord> QuantityLedger<K> {
    pub fn get<Q>(&self, key: &Q) -> Option<Decimal>
    where
        K: std::borrow::Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.0.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// All fuel-oil ledgers for one leg.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelLedgers {
    pub robs: QuantityLedger<FuelType>,
    pub port_to_port: FuelLedger,
    pub pilot_to_pilot: FuelLedger,
    pub in_harbour: FuelLedger,
    pub receipt_in_harbour: QuantityLedger<FuelType>,
    pub debunker_in_harbour: QuantityLedger<FuelType>,
}

/// Lube-oil ledgers for one leg, keyed by oil name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LubeLedgers {
    pub robs: QuantityLedger<String>,
    pub cons_in_harbour: QuantityLedger<String>,
    pub receipt_in_harbour: QuantityLedger<String>,
    pub debunker_in_harbour: QuantityLedger<String>,
}

/// Freshwater figures for one leg, in whole tonnes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshWaterCounters {
    pub rob: u64,
    pub cons_in_harbour: u64,
    pub gen_in_harbour: u64,
    pub receipt_in_harbour: u64,
    pub discharge_in_harbour: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_codes_parse() {
        for fuel in FuelType::ALL {
            assert_eq!(fuel.code().parse::<FuelType>().unwrap(), fuel);
        }
    }

    #[test]
    fn unknown_fuel_code_is_data_error() {
        let err = "BUNKER-C".parse::<FuelType>().unwrap_err();
        assert_eq!(err, DataError::UnknownFuelType("BUNKER-C".into()));
    }

    #[test]
    fn unknown_machinery_code_is_data_error() {
        let err = "me".parse::<Machinery>().unwrap_err();
        assert!(matches!(err, DataError::UnknownMachinery(_)));
    }

    #[test]
    fn serde_uses_codes_as_map_keys() {
        let mut ledger = FuelLedger::default();
        ledger
            .0
            .entry(FuelType::HeavyFuelOil)
            .or_default()
            .insert(Machinery::MainEngine, Decimal::from(5));

        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(json, r#"{"HFO":{"ME":"5"}}"#);

        let back: FuelLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }

    #[test]
    fn fuel_total_sums_consumers() {
        let mut ledger = FuelLedger::default();
        let hfo = ledger.0.entry(FuelType::HeavyFuelOil).or_default();
        hfo.insert(Machinery::MainEngine, Decimal::from(5));
        hfo.insert(Machinery::AuxiliaryEngine, Decimal::new(15, 1));

        assert_eq!(ledger.fuel_total(FuelType::HeavyFuelOil), Decimal::new(65, 1));
        assert_eq!(ledger.fuel_total(FuelType::Lng), Decimal::ZERO);
    }
}
