use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::zones::ZoneId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftProfile {
    pub code: String,
    /// Scales the stress added by one movement.
    pub weight_factor: f64,
    /// Scales the rubber worn off by one movement.
    pub rubber_factor: f64,
    /// Maximum takeoff mass, informational only.
    #[serde(default)]
    pub mtow_kg: Option<f64>,
}

impl AircraftProfile {
    pub fn new(code: &str, weight_factor: f64, rubber_factor: f64, mtow_kg: Option<f64>) -> Self {
        Self {
            code: code.to_string(),
            weight_factor,
            rubber_factor,
            mtow_kg,
        }
    }
}

/// Closed set of aircraft types operating on the runway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AircraftCatalog {
    profiles: Vec<AircraftProfile>,
}

impl Default for AircraftCatalog {
    fn default() -> Self {
        Self::new(vec![
            AircraftProfile::new("ATR72", 0.8, 0.5, Some(23_000.0)),
            AircraftProfile::new("A320", 1.2, 0.8, Some(78_000.0)),
            AircraftProfile::new("B738", 1.5, 1.0, Some(79_000.0)),
            AircraftProfile::new("A321", 1.3, 0.9, Some(93_500.0)),
            AircraftProfile::new("AT76", 1.0, 0.6, Some(23_000.0)),
        ])
    }
}

impl AircraftCatalog {
    pub fn new(profiles: Vec<AircraftProfile>) -> Self {
        Self { profiles }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.code.as_str())
    }

    pub fn get(&self, code: &str) -> SimResult<&AircraftProfile> {
        self.profiles
            .iter()
            .find(|p| p.code == code)
            .ok_or_else(|| SimError::UnknownAircraft(code.to_string()))
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.profiles.is_empty() {
            return Err(SimError::EmptyCatalog);
        }
        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if !seen.insert(profile.code.as_str()) {
                return Err(SimError::DuplicateAircraft(profile.code.clone()));
            }
            for (factor, value) in [
                ("weight_factor", profile.weight_factor),
                ("rubber_factor", profile.rubber_factor),
            ] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(SimError::InvalidFactor {
                        code: profile.code.clone(),
                        factor,
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightEvent {
    pub flight_id: String,
    pub aircraft: String,
    pub zone: ZoneId,
}

/// Draws synthetic flight movements. Ids may collide.
pub struct FlightSampler {
    codes: Vec<String>,
    num_zones: u32,
}

impl FlightSampler {
    pub fn new(catalog: &AircraftCatalog, num_zones: u32) -> SimResult<Self> {
        if catalog.is_empty() {
            return Err(SimError::EmptyCatalog);
        }
        if num_zones == 0 {
            return Err(SimError::NoZones);
        }
        Ok(Self {
            codes: catalog.codes().map(str::to_string).collect(),
            num_zones,
        })
    }

    pub fn next_flight_id<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        format!("FL{}", rng.gen_range(1000..=9999))
    }

    pub fn pick_aircraft<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.codes[rng.gen_range(0..self.codes.len())]
    }

    pub fn assign_zone<R: Rng + ?Sized>(&self, rng: &mut R) -> ZoneId {
        rng.gen_range(1..=self.num_zones)
    }

    pub fn next_event<R: Rng + ?Sized>(&self, rng: &mut R) -> FlightEvent {
        let flight_id = self.next_flight_id(rng);
        let aircraft = self.pick_aircraft(rng).to_string();
        let zone = self.assign_zone(rng);
        FlightEvent {
            flight_id,
            aircraft,
            zone,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn flight_ids_are_tagged_four_digit_numbers() {
        let sampler = FlightSampler::new(&AircraftCatalog::default(), 10).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            let id = sampler.next_flight_id(&mut rng);
            let digits = id.strip_prefix("FL").expect("FL prefix");
            assert_eq!(digits.len(), 4);
            let number: u32 = digits.parse().unwrap();
            assert!((1000..=9999).contains(&number));
        }
    }

    #[test]
    fn events_reference_catalog_and_zones() {
        let catalog = AircraftCatalog::default();
        let sampler = FlightSampler::new(&catalog, 4).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut zones_seen = HashSet::new();
        for _ in 0..200 {
            let event = sampler.next_event(&mut rng);
            assert!(catalog.get(&event.aircraft).is_ok());
            assert!((1..=4).contains(&event.zone));
            zones_seen.insert(event.zone);
        }
        assert_eq!(zones_seen.len(), 4);
    }

    #[test]
    fn unknown_aircraft_lookup_fails() {
        let catalog = AircraftCatalog::default();
        assert_eq!(
            catalog.get("C172").unwrap_err(),
            SimError::UnknownAircraft("C172".into())
        );
        assert_eq!(catalog.get("B738").unwrap().weight_factor, 1.5);
    }

    #[test]
    fn catalog_validation() {
        assert_eq!(
            AircraftCatalog::new(Vec::new()).validate().unwrap_err(),
            SimError::EmptyCatalog
        );

        let duplicated = AircraftCatalog::new(vec![
            AircraftProfile::new("A320", 1.2, 0.8, None),
            AircraftProfile::new("A320", 1.0, 0.8, None),
        ]);
        assert_eq!(
            duplicated.validate().unwrap_err(),
            SimError::DuplicateAircraft("A320".into())
        );

        let weightless =
            AircraftCatalog::new(vec![AircraftProfile::new("GLIDER", 0.0, 0.1, None)]);
        assert!(matches!(
            weightless.validate(),
            Err(SimError::InvalidFactor {
                factor: "weight_factor",
                ..
            })
        ));
    }
}
