//! Leg aggregate updater.
//!
//! Applies every section of a report to the leg's rolling summary. The
//! caller owns loading and saving; this module only folds.

use tracing::debug;

use crate::consumption;
use crate::error::DataError;
use crate::model::{LegAggregate, Report, ReportType, Section};

/// Fold a report and its sections into a leg summary.
///
/// Always records the report's type, date and offset as the leg's latest.
/// Sections the summary has no use for are skipped. On error the summary
/// may be partially updated; callers discard it.
pub fn apply(
    aggregate: &mut LegAggregate,
    report: &Report,
    sections: &[Section],
) -> Result<(), DataError> {
    aggregate.last_report_type = Some(report.report_type);
    aggregate.last_report_date = Some(report.reported_at);
    aggregate.last_report_tz = Some(report.tz_offset);

    for section in sections {
        debug!(
            report_id = %report.id,
            section = section.name(),
            "applying section"
        );
        apply_section(aggregate, report.report_type, section)?;
    }

    Ok(())
}

fn apply_section(
    agg: &mut LegAggregate,
    report_type: ReportType,
    section: &Section,
) -> Result<(), DataError> {
    match section {
        Section::Route(route) => {
            agg.route = Some(route.clone());
        }

        Section::CargoOperation(cargo) => {
            agg.load_condition = Some(cargo.load_condition);
            agg.cargo_total_at_departure = Some(cargo.total);
        }

        Section::DepartureCondition(condition) => {
            agg.displacement_at_departure = Some(condition.displacement);
        }

        Section::FuelOil(fuel) => {
            consumption::apply_fuel_oil(&mut agg.fuel, report_type, fuel)?;
        }

        Section::LubeOil(lube) => {
            consumption::apply_lube_oil(&mut agg.lube, report_type, lube)?;
        }

        Section::FreshWater(water) => {
            consumption::apply_fresh_water(&mut agg.freshwater, report_type, water)?;
        }

        Section::DistanceTime(dt) => {
            agg.total_hours = Some(dt.hours_total);
            agg.distance_observed_total = Some(dt.distance_observed_total);
            agg.distance_engine_total = Some(dt.distance_engine_total);
            agg.revolution_count = Some(dt.revolution_count);
            agg.distance_to_go = Some(dt.distance_to_go);

            if report_type == ReportType::DepartureUnderway {
                agg.distance_observed_standby_to_underway = Some(dt.distance_observed_since_last);
                agg.distance_engine_standby_to_underway = Some(dt.distance_engine_since_last);
                agg.time_standby_to_underway = Some(dt.hours_since_last);
                agg.revolution_count_standby_to_underway = Some(dt.revolution_count);
            }
        }

        Section::SailingPlan(plan) => {
            agg.distance_to_go = Some(plan.distance_to_go);
        }

        Section::Performance(perf) => {
            agg.speed_average = Some(perf.speed_average);
            agg.rpm_average = Some(perf.rpm_average);
            agg.slip_average = Some(perf.slip_average);
        }

        Section::Stoppage(stoppage) => {
            // Only full stops count; reduced-speed periods are still underway.
            if stoppage.reduced_rpm.is_zero()
                && let Some(duration) = stoppage.duration.filter(|d| !d.is_zero())
            {
                let stopped = agg.time_stopped_at_sea.unwrap_or_default();
                let total = stopped.checked_add(duration).ok_or_else(|| {
                    DataError::QuantityOverflow {
                        ledger: "time stopped at sea",
                        key: "stoppage".to_string(),
                    }
                })?;
                agg.time_stopped_at_sea = Some(total);
            }
        }

        Section::PlannedOperations(ops) => {
            if report_type == ReportType::ArrivalStandby {
                agg.next_port_plan = Some(ops.clone());
            } else if report_type.is_in_harbour() {
                agg.last_operation = Some(ops.clone());
            }
        }

        Section::ArrivalComplete(arrival) => {
            agg.parking_status = Some(arrival.parking_status.clone());
        }

        Section::Event(event) => {
            agg.parking_status = Some(event.parking_status.clone());
        }

        Section::Weather(_) | Section::PilotStation(_) | Section::BunkerDelivery(_) => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::model::{
        DistanceTime, Event, FreshWater, FuelOil, FuelOilEntry, FuelType, Machinery,
        PlannedOperations, Position, Route, Stoppage, Weather,
    };

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn report(report_type: ReportType) -> Report {
        Report {
            id: Uuid::new_v4(),
            leg_id: Uuid::nil(),
            report_type,
            seq: 1,
            reported_at: Timestamp::now(),
            tz_offset: 8.0,
            created_at: Timestamp::now(),
        }
    }

    fn hfo(rob: &str, breakdown: &[(&str, &str)]) -> Section {
        Section::FuelOil(FuelOil {
            entries: vec![FuelOilEntry {
                fuel_type: "HFO".into(),
                total_consumption: breakdown.iter().map(|(_, q)| dec(q)).sum(),
                receipt: Decimal::ZERO,
                debunkering: Decimal::ZERO,
                rob: dec(rob),
                breakdown: breakdown
                    .iter()
                    .map(|(m, q)| ((*m).to_string(), dec(q)))
                    .collect::<BTreeMap<_, _>>(),
            }],
        })
    }

    fn route(departure: &str, arrival: &str) -> Section {
        Section::Route(Route {
            departure_port: departure.into(),
            departure_date: Timestamp::UNIX_EPOCH,
            departure_tz: 0.0,
            arrival_port: arrival.into(),
            arrival_date: Timestamp::UNIX_EPOCH,
            arrival_tz: 1.0,
        })
    }

    fn stoppage(reduced_rpm: &str, duration: Option<&str>) -> Section {
        Section::Stoppage(Stoppage {
            start_date: Timestamp::UNIX_EPOCH,
            end_date: None,
            duration: duration.map(dec),
            reduced_rpm: dec(reduced_rpm),
            reason: "engine".into(),
            remarks: None,
        })
    }

    fn distance_time(since_last: &str, total: &str) -> Section {
        Section::DistanceTime(DistanceTime {
            hours_since_last: dec("2"),
            hours_total: dec("2"),
            distance_to_go: dec("480"),
            distance_observed_since_last: dec(since_last),
            distance_observed_total: dec(total),
            distance_engine_since_last: dec(since_last),
            distance_engine_total: dec(total),
            revolution_count: 9000,
            remarks: None,
        })
    }

    #[test]
    fn departure_fuel_scenario() {
        let mut agg = LegAggregate::seed(Uuid::nil(), None);

        apply(
            &mut agg,
            &report(ReportType::DepartureStandby),
            &[hfo("100", &[])],
        )
        .unwrap();
        apply(
            &mut agg,
            &report(ReportType::DepartureUnderway),
            &[hfo("95", &[("ME", "5")])],
        )
        .unwrap();

        assert_eq!(agg.fuel.robs.get(&FuelType::HeavyFuelOil), Some(dec("95")));
        assert_eq!(
            agg.fuel
                .port_to_port
                .get(FuelType::HeavyFuelOil, Machinery::MainEngine),
            Some(dec("5"))
        );
    }

    #[test]
    fn harbour_freshwater_scenario() {
        let mut agg = LegAggregate::default();
        let water = |consumed, rob| {
            Section::FreshWater(FreshWater {
                consumed,
                generated: 0,
                received: 0,
                discharged: 0,
                rob,
            })
        };

        apply(&mut agg, &report(ReportType::EventHarbour), &[water(10, 300)]).unwrap();
        apply(&mut agg, &report(ReportType::NoonPort), &[water(15, 285)]).unwrap();

        assert_eq!(agg.freshwater.cons_in_harbour, 25);
        assert_eq!(agg.freshwater.rob, 285);
    }

    #[test]
    fn second_route_wins() {
        let mut agg = LegAggregate::default();

        apply(&mut agg, &report(ReportType::Noon), &[route("SGSIN", "CNSHA")]).unwrap();
        apply(&mut agg, &report(ReportType::Noon), &[route("SGSIN", "JPYOK")]).unwrap();

        let route = agg.route.unwrap();
        assert_eq!(route.departure_port, "SGSIN");
        assert_eq!(route.arrival_port, "JPYOK");
    }

    #[test]
    fn header_fields_always_overwrite() {
        let mut agg = LegAggregate::default();
        let first = report(ReportType::Noon);
        let mut second = report(ReportType::ArrivalStandby);
        second.tz_offset = -3.5;

        apply(&mut agg, &first, &[]).unwrap();
        apply(&mut agg, &second, &[]).unwrap();

        assert_eq!(agg.last_report_type, Some(ReportType::ArrivalStandby));
        assert_eq!(agg.last_report_date, Some(second.reported_at));
        assert_eq!(agg.last_report_tz, Some(-3.5));
    }

    #[test]
    fn full_stops_accumulate_and_partial_reductions_do_not() {
        let mut agg = LegAggregate::default();

        apply(
            &mut agg,
            &report(ReportType::Noon),
            &[stoppage("0", Some("1.5"))],
        )
        .unwrap();
        apply(
            &mut agg,
            &report(ReportType::Noon),
            &[stoppage("40", Some("6"))],
        )
        .unwrap();
        apply(&mut agg, &report(ReportType::Noon), &[stoppage("0", None)]).unwrap();
        apply(
            &mut agg,
            &report(ReportType::Noon),
            &[stoppage("0", Some("2"))],
        )
        .unwrap();

        assert_eq!(agg.time_stopped_at_sea, Some(dec("3.5")));
    }

    #[test]
    fn zero_duration_stop_leaves_field_unset() {
        let mut agg = LegAggregate::default();

        apply(
            &mut agg,
            &report(ReportType::Noon),
            &[stoppage("0", Some("0"))],
        )
        .unwrap();

        assert_eq!(agg.time_stopped_at_sea, None);
    }

    #[test]
    fn departure_underway_snapshots_standby_deltas() {
        let mut agg = LegAggregate::default();

        apply(
            &mut agg,
            &report(ReportType::DepartureUnderway),
            &[distance_time("12", "12")],
        )
        .unwrap();
        apply(
            &mut agg,
            &report(ReportType::Noon),
            &[distance_time("200", "212")],
        )
        .unwrap();

        assert_eq!(agg.distance_observed_standby_to_underway, Some(dec("12")));
        assert_eq!(agg.distance_observed_total, Some(dec("212")));
        assert_eq!(agg.revolution_count_standby_to_underway, Some(9000));
    }

    #[test]
    fn planned_operations_route_by_report_type() {
        let mut agg = LegAggregate::default();
        let ops = PlannedOperations {
            crew_change: true,
            ..PlannedOperations::default()
        };
        let section = Section::PlannedOperations(ops.clone());

        apply(&mut agg, &report(ReportType::Noon), &[section.clone()]).unwrap();
        assert_eq!(agg.next_port_plan, None);
        assert_eq!(agg.last_operation, None);

        apply(&mut agg, &report(ReportType::ArrivalStandby), &[section.clone()]).unwrap();
        assert_eq!(agg.next_port_plan, Some(ops.clone()));

        apply(&mut agg, &report(ReportType::EventPort), &[section]).unwrap();
        assert_eq!(agg.last_operation, Some(ops));
    }

    #[test]
    fn event_sets_parking_status() {
        let mut agg = LegAggregate::default();
        let event = Section::Event(Event {
            time: Timestamp::UNIX_EPOCH,
            position: Position { lat: 1.26, lon: 103.8 },
            distance_travelled: 3,
            parking_status: "anchored".into(),
        });

        apply(&mut agg, &report(ReportType::EventHarbour), &[event]).unwrap();

        assert_eq!(agg.parking_status.as_deref(), Some("anchored"));
    }

    #[test]
    fn archive_only_sections_change_nothing_but_header() {
        let mut agg = LegAggregate::seed(Uuid::nil(), Some(dec("4.2")));
        let weather = Section::Weather(Weather {
            notation: "bc".into(),
            visibility: 9,
            wind_direction: "NE".into(),
            wind_speed: dec("14"),
            sea_state: 4,
            air_pressure: 1012,
            air_temperature: dec("28.5"),
            sea_temperature: dec("29"),
        });
        let rep = report(ReportType::Noon);

        apply(&mut agg, &rep, &[weather]).unwrap();

        let mut expected = LegAggregate::seed(Uuid::nil(), Some(dec("4.2")));
        expected.last_report_type = Some(ReportType::Noon);
        expected.last_report_date = Some(rep.reported_at);
        expected.last_report_tz = Some(rep.tz_offset);
        assert_eq!(agg, expected);
    }

    #[test]
    fn bad_fuel_code_is_data_error() {
        let mut agg = LegAggregate::default();
        let section = Section::FuelOil(FuelOil {
            entries: vec![FuelOilEntry {
                fuel_type: "KERO".into(),
                total_consumption: Decimal::ZERO,
                receipt: Decimal::ZERO,
                debunkering: Decimal::ZERO,
                rob: Decimal::ONE,
                breakdown: BTreeMap::new(),
            }],
        });

        let err = apply(&mut agg, &report(ReportType::Noon), &[section]).unwrap_err();
        assert_eq!(err, DataError::UnknownFuelType("KERO".into()));
    }

    #[test]
    fn overflowing_stoppage_time_is_data_error() {
        let mut agg = LegAggregate {
            time_stopped_at_sea: Some(Decimal::MAX),
            ..LegAggregate::default()
        };

        let err = apply(
            &mut agg,
            &report(ReportType::Noon),
            &[stoppage("0", Some("1"))],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            DataError::QuantityOverflow { ledger: "time stopped at sea", .. }
        ));
        assert_eq!(agg.time_stopped_at_sea, Some(Decimal::MAX));
    }
}
