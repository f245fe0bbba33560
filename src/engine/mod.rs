//! Per-event runway wear model.

use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    error::SimResult,
    flights::{AircraftCatalog, AircraftProfile, FlightEvent},
    record::{round2, RunwayRecord},
    rng::{RngManager, Stream},
    weather::WeatherSample,
    zones::{ZoneState, ZoneStore},
};

/// Fixed limits behind the engine's anomaly flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub stress: f64,
    pub rubber_mm: f64,
    pub cracks_mm: f64,
    pub water_mm: f64,
    pub fod_weight_g: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stress: 100.0,
            rubber_mm: 2.0,
            cracks_mm: 5.0,
            water_mm: 10.0,
            fod_weight_g: 50.0,
        }
    }
}

impl Thresholds {
    pub fn breached(&self, state: &ZoneState) -> bool {
        state.stress > self.stress
            || state.rubber_mm < self.rubber_mm
            || state.cracks_mm > self.cracks_mm
            || state.water_mm > self.water_mm
            || state.fod_weight_g > self.fod_weight_g
    }

    pub fn breached_by(&self, record: &RunwayRecord) -> bool {
        self.breached(&ZoneState {
            stress: record.stress,
            rubber_mm: record.rubber_mm,
            cracks_mm: record.cracks_mm,
            water_mm: record.water_mm,
            fod_weight_g: record.fod_weight_g,
        })
    }
}

/// Mutable state threaded through one simulated run.
pub struct SimulationContext {
    pub zones: ZoneStore,
    pub rng: RngManager,
}

impl SimulationContext {
    pub fn new(num_zones: u32, seed: u64) -> SimResult<Self> {
        let mut rng = RngManager::new(seed);
        let zones = ZoneStore::new(num_zones, rng.stream(Stream::Zones))?;
        Ok(Self { zones, rng })
    }

    pub fn with_zones(zones: ZoneStore, seed: u64) -> Self {
        Self {
            zones,
            rng: RngManager::new(seed),
        }
    }
}

/// Wear caused by a single movement, already rounded to wire precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wear {
    pub stress_delta: f64,
    pub rubber_wear: f64,
    pub cracks_growth: f64,
    pub water_accum: f64,
    pub fod_weight: f64,
}

impl Wear {
    pub fn draw<R: Rng + ?Sized>(
        profile: &AircraftProfile,
        weather: &WeatherSample,
        rng: &mut R,
    ) -> Self {
        let stress_delta = round2(rng.gen_range(0.5..=2.0) * profile.weight_factor);
        let rubber_wear = round2(rng.gen_range(0.1..=0.5) * profile.rubber_factor);
        let cracks_growth = round2(rng.gen_range(0.05..=0.2));
        let water_accum = round2(weather.rain_mm * rng.gen_range(0.1..=0.5));
        let fod_weight = round2(rng.gen_range(0.0..=5.0));
        Self {
            stress_delta,
            rubber_wear,
            cracks_growth,
            water_accum,
            fod_weight,
        }
    }

    /// Humidity amplifies only the stress added by this movement.
    pub fn apply(&self, state: &mut ZoneState, humidity_pct: f64) {
        state.stress += self.stress_delta * (1.0 + humidity_pct / 100.0);
        state.rubber_mm = (state.rubber_mm - self.rubber_wear).max(0.0);
        state.cracks_mm += self.cracks_growth;
        state.water_mm = self.water_accum;
        state.fod_weight_g = self.fod_weight;
    }
}

/// Zone metrics as they appear on the wire.
pub fn emitted(state: &ZoneState) -> ZoneState {
    ZoneState {
        stress: round2(state.stress),
        rubber_mm: round2(state.rubber_mm),
        cracks_mm: round2(state.cracks_mm),
        water_mm: round2(state.water_mm),
        fod_weight_g: round2(state.fod_weight_g),
    }
}

pub struct DegradationEngine {
    catalog: AircraftCatalog,
    thresholds: Thresholds,
}

impl DegradationEngine {
    pub fn new(catalog: AircraftCatalog, thresholds: Thresholds) -> Self {
        Self {
            catalog,
            thresholds,
        }
    }

    pub fn catalog(&self) -> &AircraftCatalog {
        &self.catalog
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Advances the zone addressed by `event` and emits the resulting record.
    pub fn apply(
        &self,
        ctx: &mut SimulationContext,
        timestamp: NaiveDateTime,
        event: &FlightEvent,
        weather: &WeatherSample,
    ) -> SimResult<RunwayRecord> {
        let profile = self.catalog.get(&event.aircraft)?;
        let zone = ctx.zones.get_mut(event.zone)?;
        let wear = Wear::draw(profile, weather, ctx.rng.stream(Stream::Degradation));

        let was_anomalous = self.thresholds.breached(&emitted(zone));
        wear.apply(zone, weather.humidity_pct);
        let snapshot = emitted(zone);
        let anomaly = self.thresholds.breached(&snapshot);

        if anomaly && !was_anomalous {
            tracing::warn!(
                zone = event.zone,
                %timestamp,
                stress = snapshot.stress,
                rubber_mm = snapshot.rubber_mm,
                cracks_mm = snapshot.cracks_mm,
                "zone crossed a maintenance threshold"
            );
        }

        Ok(RunwayRecord {
            timestamp,
            flight_id: event.flight_id.clone(),
            aircraft: event.aircraft.clone(),
            zone: event.zone,
            rubber_mm: snapshot.rubber_mm,
            cracks_mm: snapshot.cracks_mm,
            water_mm: snapshot.water_mm,
            stress: snapshot.stress,
            fod_weight_g: snapshot.fod_weight_g,
            temperature_c: round2(weather.temperature_c),
            humidity_pct: round2(weather.humidity_pct),
            rain_mm: round2(weather.rain_mm),
            anomaly,
            wind_speed_mps: weather.wind.map(|w| round2(w.speed_mps)),
            wind_direction_deg: weather.wind.map(|w| round2(w.direction_deg)),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::error::SimError;

    fn state(stress: f64, rubber_mm: f64, cracks_mm: f64) -> ZoneState {
        ZoneState {
            stress,
            rubber_mm,
            cracks_mm,
            water_mm: 0.0,
            fod_weight_g: 0.0,
        }
    }

    fn dry_weather(humidity_pct: f64) -> WeatherSample {
        WeatherSample {
            temperature_c: 30.0,
            humidity_pct,
            rain_mm: 0.0,
            wind: None,
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn event(aircraft: &str, zone: u32) -> FlightEvent {
        FlightEvent {
            flight_id: "FL1234".into(),
            aircraft: aircraft.into(),
            zone,
        }
    }

    #[test]
    fn single_stress_breach_raises_anomaly() {
        let thresholds = Thresholds::default();
        assert!(thresholds.breached(&state(101.0, 5.0, 1.0)));
        assert!(!thresholds.breached(&state(50.0, 5.0, 1.0)));
    }

    #[test]
    fn each_threshold_is_independent() {
        let thresholds = Thresholds::default();
        let calm = state(50.0, 5.0, 1.0);
        assert!(thresholds.breached(&ZoneState { rubber_mm: 1.99, ..calm }));
        assert!(thresholds.breached(&ZoneState { cracks_mm: 5.01, ..calm }));
        assert!(thresholds.breached(&ZoneState { water_mm: 10.5, ..calm }));
        assert!(thresholds.breached(&ZoneState { fod_weight_g: 51.0, ..calm }));
        // limits themselves are not breaches
        assert!(!thresholds.breached(&ZoneState {
            stress: 100.0,
            rubber_mm: 2.0,
            cracks_mm: 5.0,
            water_mm: 10.0,
            fod_weight_g: 50.0,
        }));
    }

    #[test]
    fn humidity_scales_only_the_new_delta() {
        let wear = Wear {
            stress_delta: 2.0,
            rubber_wear: 0.3,
            cracks_growth: 0.1,
            water_accum: 4.0,
            fod_weight: 1.5,
        };
        let mut zone = state(10.0, 5.0, 1.0);
        zone.water_mm = 9.0;
        zone.fod_weight_g = 3.0;
        wear.apply(&mut zone, 50.0);

        assert_eq!(zone.stress, 13.0);
        assert!((zone.rubber_mm - 4.7).abs() < 1e-9);
        assert!((zone.cracks_mm - 1.1).abs() < 1e-9);
        assert_eq!(zone.water_mm, 4.0);
        assert_eq!(zone.fod_weight_g, 1.5);
    }

    #[test]
    fn rubber_is_floored_at_zero() {
        let wear = Wear {
            stress_delta: 0.5,
            rubber_wear: 0.5,
            cracks_growth: 0.05,
            water_accum: 0.0,
            fod_weight: 0.0,
        };
        let mut zone = state(0.0, 0.2, 0.0);
        wear.apply(&mut zone, 40.0);
        assert_eq!(zone.rubber_mm, 0.0);
    }

    #[test]
    fn apply_touches_only_the_addressed_zone() {
        let zones = ZoneStore::from_states((1..=3).map(|z| (z, state(0.0, 8.0, 1.0)))).unwrap();
        let mut ctx = SimulationContext::with_zones(zones, 1);
        let engine = DegradationEngine::new(AircraftCatalog::default(), Thresholds::default());

        let record = engine
            .apply(&mut ctx, noon(), &event("B738", 2), &dry_weather(60.0))
            .unwrap();

        assert_eq!(record.zone, 2);
        assert_eq!(record.timestamp, noon());
        assert_eq!(*ctx.zones.get(1).unwrap(), state(0.0, 8.0, 1.0));
        assert_eq!(*ctx.zones.get(3).unwrap(), state(0.0, 8.0, 1.0));
        let touched = ctx.zones.get(2).unwrap();
        assert!(touched.stress > 0.0);
        assert!(touched.rubber_mm < 8.0);
        assert_eq!(record.stress, round2(touched.stress));
        assert_eq!(record.water_mm, 0.0);
    }

    #[test]
    fn worn_zone_is_flagged() {
        let zones = ZoneStore::from_states([(1, state(0.0, 1.0, 1.0))]).unwrap();
        let mut ctx = SimulationContext::with_zones(zones, 1);
        let engine = DegradationEngine::new(AircraftCatalog::default(), Thresholds::default());
        let record = engine
            .apply(&mut ctx, noon(), &event("ATR72", 1), &dry_weather(40.0))
            .unwrap();
        assert!(record.anomaly);
        assert!(Thresholds::default().breached_by(&record));
    }

    #[test]
    fn unknown_aircraft_is_fatal() {
        let mut ctx = SimulationContext::new(2, 4).unwrap();
        let engine = DegradationEngine::new(AircraftCatalog::default(), Thresholds::default());
        let before = *ctx.zones.get(1).unwrap();
        let err = engine
            .apply(&mut ctx, noon(), &event("C172", 1), &dry_weather(50.0))
            .unwrap_err();
        assert_eq!(err, SimError::UnknownAircraft("C172".into()));
        assert_eq!(*ctx.zones.get(1).unwrap(), before);
    }

    #[test]
    fn draws_respect_aircraft_factors() {
        let mut ctx = SimulationContext::new(1, 99).unwrap();
        let catalog = AircraftCatalog::default();
        let profile = catalog.get("B738").unwrap();
        let weather = WeatherSample {
            rain_mm: 20.0,
            ..dry_weather(50.0)
        };
        for _ in 0..200 {
            let wear = Wear::draw(profile, &weather, ctx.rng.stream(Stream::Degradation));
            assert!((0.75..=3.0).contains(&wear.stress_delta));
            assert!((0.1..=0.5).contains(&wear.rubber_wear));
            assert!((0.05..=0.2).contains(&wear.cracks_growth));
            assert!((2.0..=10.0).contains(&wear.water_accum));
            assert!((0.0..=5.0).contains(&wear.fod_weight));
        }
    }
}
