use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Duration;
use smartzone::{
    flights::{AircraftCatalog, AircraftProfile},
    scenario::{Scenario, ScenarioLoader},
    sink::{self, CsvSink, JsonSink, RecordSink},
    RunwayRecord, SimError,
};

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn scenario_path() -> PathBuf {
    PathBuf::from("scenarios/runway_day.yaml")
}

fn simulate(scenario: &Scenario, seed: u64) -> Vec<RunwayRecord> {
    let scheduler = scenario.build_scheduler().expect("valid scenario");
    let mut ctx = scenario.build_context(seed).expect("zones");
    scheduler
        .simulate_run(
            &mut ctx,
            scenario.schedule.start_time,
            scenario.schedule.interval_minutes,
        )
        .expect("run succeeds")
}

#[test]
fn scenario_loader_reads_fixture() {
    let scenario = scenario_loader().load(scenario_path()).expect("scenario parses");
    assert_eq!(scenario.name, "runway_day");
    assert_eq!(scenario.seed, Some(2025));
    assert_eq!(scenario.runway.num_zones, 10);
    assert_eq!(scenario.aircraft.len(), 5);
    assert_eq!(scenario.aircraft.get("A321").unwrap().mtow_kg, Some(93_500.0));
    assert_eq!(scenario.weather, Scenario::default().weather);
}

#[test]
fn missing_scenario_reports_path() {
    let err = scenario_loader().load("scenarios/nope.yaml").unwrap_err();
    assert!(format!("{err:#}").contains("nope.yaml"));
}

#[test]
fn day_run_is_ordered_and_within_window() {
    let scenario = scenario_loader().load(scenario_path()).unwrap();
    let records = simulate(&scenario, 2025);
    let start = scenario.schedule.start_time;

    assert!(!records.is_empty());
    assert!(records[0].timestamp >= start);
    assert!(records.last().unwrap().timestamp < start + Duration::hours(24));
    assert!(records
        .windows(2)
        .all(|pair| pair[0].timestamp < pair[1].timestamp));
    assert!(records.iter().all(|r| (1..=10).contains(&r.zone)));
}

#[test]
fn same_seed_gives_identical_csv() {
    let scenario = scenario_loader().load(scenario_path()).unwrap();
    let temp = tempfile::tempdir().unwrap();
    let path_a = temp.path().join("a.csv");
    let path_b = temp.path().join("b.csv");

    CsvSink::new(&path_a)
        .write(&simulate(&scenario, 77))
        .unwrap();
    CsvSink::new(&path_b)
        .write(&simulate(&scenario, 77))
        .unwrap();

    let bytes_a = std::fs::read(&path_a).unwrap();
    let bytes_b = std::fs::read(&path_b).unwrap();
    assert_eq!(bytes_a, bytes_b);

    let other = simulate(&scenario, 78);
    assert_ne!(simulate(&scenario, 77), other);
}

#[test]
fn anomaly_flag_matches_record_fields() {
    let scenario = scenario_loader().load(scenario_path()).unwrap();
    for seed in 0..10 {
        for record in simulate(&scenario, seed) {
            assert_eq!(
                record.anomaly,
                scenario.thresholds.breached_by(&record),
                "{record:?}"
            );
        }
    }
}

#[test]
fn zone_wear_is_monotonic() {
    let scenario = scenario_loader().load(scenario_path()).unwrap();
    let records = simulate(&scenario, 11);
    let mut last: BTreeMap<u32, &RunwayRecord> = BTreeMap::new();
    for record in &records {
        assert!(record.rubber_mm >= 0.0);
        if let Some(previous) = last.insert(record.zone, record) {
            assert!(record.stress >= previous.stress);
            assert!(record.cracks_mm >= previous.cracks_mm);
            assert!(record.rubber_mm <= previous.rubber_mm);
        }
    }
}

#[test]
fn monsoon_days_are_wetter() {
    let mut scenario = scenario_loader().load(scenario_path()).unwrap();
    scenario.schedule.start_time = "2025-07-10T00:00:00".parse().unwrap();
    let wet = simulate(&scenario, 5);
    assert!(wet.iter().all(|r| r.rain_mm >= 5.0 && r.humidity_pct >= 70.0));

    scenario.schedule.start_time = "2025-01-10T00:00:00".parse().unwrap();
    let dry = simulate(&scenario, 5);
    assert!(dry.iter().all(|r| r.rain_mm <= 20.0 && r.humidity_pct <= 80.0));
}

#[test]
fn csv_and_json_sinks_round_trip() {
    let scenario = scenario_loader().load(scenario_path()).unwrap();
    let records = simulate(&scenario, 3);
    let temp = tempfile::tempdir().unwrap();
    let csv_path = temp.path().join("out").join("runway_data.csv");
    let json_path = temp.path().join("out").join("runway_data.json");

    CsvSink::new(&csv_path).write(&records).unwrap();
    JsonSink::new(&json_path).write(&records).unwrap();

    let header = std::fs::read_to_string(&csv_path)
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .to_string();
    assert_eq!(
        header,
        "timestamp,flight_id,aircraft,zone,rubber_mm,cracks_mm,water_mm,stress,fod_weight_g,temperature_C,humidity_pct,rain_mm,anomaly"
    );
    assert_eq!(sink::load_csv(&csv_path).unwrap(), records);
    assert_eq!(sink::load_json(&json_path).unwrap(), records);
}

#[test]
fn csv_round_trips_awkward_aircraft_codes() {
    let mut scenario = scenario_loader().load(scenario_path()).unwrap();
    scenario.aircraft = AircraftCatalog::new(vec![
        AircraftProfile::new("A3\n20", 1.0, 1.0, None),
        AircraftProfile::new("B7,38", 1.2, 1.1, None),
        AircraftProfile::new("\"E190\"", 0.8, 0.7, None),
    ]);
    let records = simulate(&scenario, 11);

    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("codes.csv");
    CsvSink::new(&path).write(&records).unwrap();
    assert_eq!(sink::load_csv(&path).unwrap(), records);
}

#[test]
fn wind_columns_follow_configuration() {
    let mut scenario = scenario_loader().load(scenario_path()).unwrap();
    scenario.weather.wind_enabled = true;
    let records = simulate(&scenario, 3);
    assert!(records.iter().all(RunwayRecord::has_wind));

    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("wind.csv");
    CsvSink::new(&path).write(&records).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text
        .lines()
        .next()
        .unwrap()
        .ends_with("anomaly,wind_speed_mps,wind_direction_deg"));
    assert_eq!(sink::load_csv(&path).unwrap(), records);
}

#[test]
fn invalid_overrides_are_rejected() {
    let mut scenario = scenario_loader().load(scenario_path()).unwrap();
    scenario.schedule.interval_minutes = 5;
    assert!(matches!(
        scenario.build_scheduler(),
        Err(SimError::NonPositiveInterval { .. })
    ));

    let scheduler = scenario_loader()
        .load(scenario_path())
        .unwrap()
        .build_scheduler()
        .unwrap();
    let mut ctx = scenario.build_context(1).unwrap();
    assert!(scheduler
        .simulate_run(&mut ctx, scenario.schedule.start_time, 0)
        .is_err());

    scenario.runway.num_zones = 0;
    assert_eq!(scenario.build_context(1).err(), Some(SimError::NoZones));
}
