use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Runway zone number, `1..=num_zones`.
pub type ZoneId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneState {
    /// Cumulative mechanical stress. Never decreases within a run.
    pub stress: f64,
    pub rubber_mm: f64,
    /// Cumulative crack depth. Never decreases within a run.
    pub cracks_mm: f64,
    /// Water left by the most recent event only.
    pub water_mm: f64,
    /// Debris weight seen by the most recent event only.
    pub fod_weight_g: f64,
}

impl ZoneState {
    pub fn fresh<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            stress: 0.0,
            rubber_mm: rng.gen_range(5.0..=10.0),
            cracks_mm: rng.gen_range(0.0..=2.0),
            water_mm: 0.0,
            fod_weight_g: 0.0,
        }
    }
}

/// Per-zone degradation metrics for one simulated run.
#[derive(Debug, Clone)]
pub struct ZoneStore {
    zones: BTreeMap<ZoneId, ZoneState>,
}

impl ZoneStore {
    pub fn new<R: Rng + ?Sized>(num_zones: u32, rng: &mut R) -> SimResult<Self> {
        if num_zones == 0 {
            return Err(SimError::NoZones);
        }
        let zones = (1..=num_zones)
            .map(|zone| (zone, ZoneState::fresh(rng)))
            .collect();
        Ok(Self { zones })
    }

    /// Builds a store from explicit states, mainly for fixtures.
    pub fn from_states(states: impl IntoIterator<Item = (ZoneId, ZoneState)>) -> SimResult<Self> {
        let zones: BTreeMap<_, _> = states.into_iter().collect();
        if zones.is_empty() {
            return Err(SimError::NoZones);
        }
        Ok(Self { zones })
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn get(&self, zone: ZoneId) -> SimResult<&ZoneState> {
        self.zones.get(&zone).ok_or(SimError::UnknownZone(zone))
    }

    pub fn get_mut(&mut self, zone: ZoneId) -> SimResult<&mut ZoneState> {
        self.zones.get_mut(&zone).ok_or(SimError::UnknownZone(zone))
    }

    pub fn zone_ids(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.zones.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &ZoneState)> {
        self.zones.iter().map(|(id, state)| (*id, state))
    }
}
