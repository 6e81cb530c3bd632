//! Consumption accumulator.
//!
//! Folds the fuel oil, lube oil and freshwater sections of a report into a
//! leg's ledgers. ROB figures always overwrite. Everything else is additive,
//! and which ledgers a report may add into depends on its [`ReportType`].
//!
//! Every entry is parsed and every sum checked before the ledgers are
//! replaced, so a bad code or an overflowing total leaves them as they were.

use std::collections::BTreeMap;
use std::fmt::Display;

use rust_decimal::Decimal;

use crate::error::DataError;
use crate::model::{
    ConsumptionWindow, FreshWater, FreshWaterCounters, FuelLedger, FuelLedgers, FuelOil, FuelType,
    LubeLedgers, LubeOil, Machinery, QuantityLedger, ReportType,
};

/// Parse a raw machinery breakdown into typed keys.
pub fn parse_breakdown(
    raw: &BTreeMap<String, Decimal>,
) -> Result<BTreeMap<Machinery, Decimal>, DataError> {
    raw.iter()
        .map(|(code, qty)| code.parse::<Machinery>().map(|machinery| (machinery, *qty)))
        .collect()
}

/// Add a breakdown into one fuel's entry of a ledger.
///
/// Consumers already present are summed; new consumers are inserted. On
/// overflow the ledger may be partly updated.
pub fn add_breakdown(
    ledger: &mut FuelLedger,
    name: &'static str,
    fuel: FuelType,
    breakdown: &BTreeMap<Machinery, Decimal>,
) -> Result<(), DataError> {
    let per_fuel = ledger.0.entry(fuel).or_default();
    for (machinery, qty) in breakdown {
        let total = per_fuel.entry(*machinery).or_default();
        *total = total
            .checked_add(*qty)
            .ok_or_else(|| overflow(name, format!("{fuel}/{machinery}")))?;
    }
    Ok(())
}

/// Add a quantity to a flat ledger.
pub fn add_quantity<K: Ord + Display>(
    ledger: &mut QuantityLedger<K>,
    name: &'static str,
    key: K,
    qty: Decimal,
) -> Result<(), DataError> {
    let sum = ledger
        .0
        .get(&key)
        .copied()
        .unwrap_or_default()
        .checked_add(qty)
        .ok_or_else(|| overflow(name, key.to_string()))?;
    ledger.0.insert(key, sum);
    Ok(())
}

/// Overwrite a quantity in a flat ledger.
pub fn set_quantity<K: Ord>(ledger: &mut QuantityLedger<K>, key: K, qty: Decimal) {
    ledger.0.insert(key, qty);
}

fn overflow(ledger: &'static str, key: String) -> DataError {
    DataError::QuantityOverflow { ledger, key }
}

fn window_ledger(
    ledgers: &mut FuelLedgers,
    window: ConsumptionWindow,
) -> (&mut FuelLedger, &'static str) {
    match window {
        ConsumptionWindow::PortToPort => (&mut ledgers.port_to_port, "port-to-port"),
        ConsumptionWindow::PilotToPilot => (&mut ledgers.pilot_to_pilot, "pilot-to-pilot"),
        ConsumptionWindow::InHarbour => (&mut ledgers.in_harbour, "in-harbour"),
    }
}

/// Apply a fuel oil section.
pub fn apply_fuel_oil(
    ledgers: &mut FuelLedgers,
    report_type: ReportType,
    section: &FuelOil,
) -> Result<(), DataError> {
    let parsed = section
        .entries
        .iter()
        .map(|entry| -> Result<_, DataError> {
            let fuel = entry.fuel_type.parse::<FuelType>()?;
            let breakdown = parse_breakdown(&entry.breakdown)?;
            Ok((fuel, breakdown, entry))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut next = ledgers.clone();
    for (fuel, breakdown, entry) in parsed {
        set_quantity(&mut next.robs, fuel, entry.rob);

        for window in report_type.consumption_windows() {
            let (ledger, name) = window_ledger(&mut next, *window);
            add_breakdown(ledger, name, fuel, &breakdown)?;
        }

        if report_type.is_in_harbour() {
            add_quantity(&mut next.receipt_in_harbour, "fuel receipt", fuel, entry.receipt)?;
            add_quantity(
                &mut next.debunker_in_harbour,
                "fuel debunkering",
                fuel,
                entry.debunkering,
            )?;
        }
    }

    *ledgers = next;
    Ok(())
}

/// Apply a lube oil section. Oil names are free-form, so only an
/// overflowing total can fail.
pub fn apply_lube_oil(
    ledgers: &mut LubeLedgers,
    report_type: ReportType,
    section: &LubeOil,
) -> Result<(), DataError> {
    let mut next = ledgers.clone();
    for entry in &section.entries {
        set_quantity(&mut next.robs, entry.oil.clone(), entry.rob);

        if report_type.is_in_harbour() {
            add_quantity(
                &mut next.cons_in_harbour,
                "lube consumption",
                entry.oil.clone(),
                entry.total_consumption,
            )?;
            add_quantity(
                &mut next.receipt_in_harbour,
                "lube receipt",
                entry.oil.clone(),
                entry.receipt,
            )?;
            add_quantity(
                &mut next.debunker_in_harbour,
                "lube debunkering",
                entry.oil.clone(),
                entry.debunkering,
            )?;
        }
    }

    *ledgers = next;
    Ok(())
}

/// Apply a freshwater section.
pub fn apply_fresh_water(
    counters: &mut FreshWaterCounters,
    report_type: ReportType,
    section: &FreshWater,
) -> Result<(), DataError> {
    if report_type.is_in_harbour() {
        let add = |total: u64, qty: u64, name: &'static str| {
            total
                .checked_add(qty)
                .ok_or_else(|| overflow(name, "in harbour".to_string()))
        };
        let consumed = add(counters.cons_in_harbour, section.consumed, "freshwater consumption")?;
        let generated = add(counters.gen_in_harbour, section.generated, "freshwater generation")?;
        let received = add(counters.receipt_in_harbour, section.received, "freshwater receipt")?;
        let discharged = add(
            counters.discharge_in_harbour,
            section.discharged,
            "freshwater discharge",
        )?;

        counters.cons_in_harbour = consumed;
        counters.gen_in_harbour = generated;
        counters.receipt_in_harbour = received;
        counters.discharge_in_harbour = discharged;
    }

    counters.rob = section.rob;
    Ok(())
}
