use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{DegradationEngine, SimulationContext, Thresholds},
    error::{SimError, SimResult},
    flights::{AircraftCatalog, FlightSampler},
    scheduler::{DayScheduler, ScheduleConfig},
    weather::{WeatherConfig, WeatherModel},
};

fn default_name() -> String {
    "default_runway".to_string()
}

fn default_length_m() -> f64 {
    2427.0
}

fn default_num_zones() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayConfig {
    #[serde(default = "default_length_m")]
    pub length_m: f64,
    #[serde(default = "default_num_zones")]
    pub num_zones: u32,
}

impl Default for RunwayConfig {
    fn default() -> Self {
        Self {
            length_m: default_length_m(),
            num_zones: default_num_zones(),
        }
    }
}

impl RunwayConfig {
    pub fn zone_length_m(&self) -> f64 {
        self.length_m / f64::from(self.num_zones.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Runs are irreproducible when no seed is given.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub runway: RunwayConfig,
    #[serde(default)]
    pub aircraft: AircraftCatalog,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: None,
            seed: None,
            runway: RunwayConfig::default(),
            aircraft: AircraftCatalog::default(),
            weather: WeatherConfig::default(),
            thresholds: Thresholds::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario = Scenario::from_yaml(&data)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(text).context("invalid scenario yaml")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.runway.num_zones == 0 {
            return Err(SimError::NoZones);
        }
        if !self.runway.length_m.is_finite() || self.runway.length_m <= 0.0 {
            return Err(SimError::InvalidRange {
                field: "runway.length_m".into(),
                min: 0.0,
                max: self.runway.length_m,
            });
        }
        self.aircraft.validate()?;
        self.weather.validate()?;
        self.schedule.validate()
    }

    pub fn build_context(&self, seed: u64) -> SimResult<SimulationContext> {
        SimulationContext::new(self.runway.num_zones, seed)
    }

    pub fn build_scheduler(&self) -> SimResult<DayScheduler> {
        self.validate()?;
        DayScheduler::new(
            FlightSampler::new(&self.aircraft, self.runway.num_zones)?,
            WeatherModel::new(self.weather.clone()),
            DegradationEngine::new(self.aircraft.clone(), self.thresholds),
            &self.schedule,
        )
    }
}
