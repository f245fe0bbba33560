//! Seasonal ambient conditions sampled once per flight event.

use chrono::{Datelike, Month};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::record::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Baseline,
    Monsoon,
}

impl Season {
    pub fn for_month(month: Month) -> Self {
        use Month::*;
        match month {
            May | June | July | August | September | October => Season::Monsoon,
            January | February | March | April | November | December => Season::Baseline,
        }
    }

    /// Season for a 1-based month number.
    pub fn from_month_number(month: u32) -> SimResult<Self> {
        u8::try_from(month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(Self::for_month)
            .ok_or(SimError::InvalidMonth(month))
    }

    pub fn of(date: &impl Datelike) -> SimResult<Self> {
        Self::from_month_number(date.month())
    }
}

/// Closed uniform range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherRange {
    pub min: f64,
    pub max: f64,
}

impl WeatherRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn validate(&self, field: &str) -> SimResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(SimError::InvalidRange {
                field: field.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindRanges {
    pub speed_mps: WeatherRange,
    pub direction_deg: WeatherRange,
}

impl Default for WindRanges {
    fn default() -> Self {
        Self {
            speed_mps: WeatherRange::new(0.0, 15.0),
            direction_deg: WeatherRange::new(0.0, 360.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRegime {
    pub temperature_c: WeatherRange,
    pub humidity_pct: WeatherRange,
    pub rain_mm: WeatherRange,
    /// Falls back to the model-wide wind ranges when absent.
    #[serde(default)]
    pub wind: Option<WindRanges>,
}

impl WeatherRegime {
    pub fn baseline() -> Self {
        Self {
            temperature_c: WeatherRange::new(22.0, 38.0),
            humidity_pct: WeatherRange::new(40.0, 80.0),
            rain_mm: WeatherRange::new(0.0, 20.0),
            wind: None,
        }
    }

    pub fn monsoon() -> Self {
        Self {
            temperature_c: WeatherRange::new(24.0, 34.0),
            humidity_pct: WeatherRange::new(70.0, 100.0),
            rain_mm: WeatherRange::new(5.0, 60.0),
            wind: None,
        }
    }

    fn validate(&self, label: &str) -> SimResult<()> {
        self.temperature_c
            .validate(&format!("weather.{label}.temperature_c"))?;
        self.humidity_pct
            .validate(&format!("weather.{label}.humidity_pct"))?;
        self.rain_mm.validate(&format!("weather.{label}.rain_mm"))?;
        if let Some(wind) = &self.wind {
            wind.speed_mps
                .validate(&format!("weather.{label}.wind.speed_mps"))?;
            wind.direction_deg
                .validate(&format!("weather.{label}.wind.direction_deg"))?;
        }
        Ok(())
    }
}

fn default_baseline() -> WeatherRegime {
    WeatherRegime::baseline()
}

fn default_monsoon() -> WeatherRegime {
    WeatherRegime::monsoon()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_baseline")]
    pub baseline: WeatherRegime,
    #[serde(default = "default_monsoon")]
    pub monsoon: WeatherRegime,
    /// Wind is only drawn (and emitted) when enabled.
    #[serde(default)]
    pub wind_enabled: bool,
    #[serde(default)]
    pub wind: WindRanges,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            baseline: WeatherRegime::baseline(),
            monsoon: WeatherRegime::monsoon(),
            wind_enabled: false,
            wind: WindRanges::default(),
        }
    }
}

impl WeatherConfig {
    pub fn validate(&self) -> SimResult<()> {
        self.baseline.validate("baseline")?;
        self.monsoon.validate("monsoon")?;
        self.wind.speed_mps.validate("weather.wind.speed_mps")?;
        self.wind.direction_deg.validate("weather.wind.direction_deg")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_mps: f64,
    pub direction_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    #[serde(rename = "temperature_C")]
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub rain_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<Wind>,
}

pub struct WeatherModel {
    config: WeatherConfig,
}

impl WeatherModel {
    pub fn new(config: WeatherConfig) -> Self {
        Self { config }
    }

    pub fn regime(&self, season: Season) -> &WeatherRegime {
        match season {
            Season::Baseline => &self.config.baseline,
            Season::Monsoon => &self.config.monsoon,
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, season: Season, rng: &mut R) -> WeatherSample {
        let regime = self.regime(season);
        let temperature_c = round2(regime.temperature_c.sample(rng));
        let humidity_pct = round2(regime.humidity_pct.sample(rng));
        let rain_mm = round2(regime.rain_mm.sample(rng));
        let wind = self.config.wind_enabled.then(|| {
            let ranges = regime.wind.as_ref().unwrap_or(&self.config.wind);
            Wind {
                speed_mps: round2(ranges.speed_mps.sample(rng)),
                direction_deg: round2(ranges.direction_deg.sample(rng)),
            }
        });
        WeatherSample {
            temperature_c,
            humidity_pct,
            rain_mm,
            wind,
        }
    }

    pub fn sample_for<R: Rng + ?Sized>(
        &self,
        date: &impl Datelike,
        rng: &mut R,
    ) -> SimResult<WeatherSample> {
        Ok(self.sample(Season::of(date)?, rng))
    }
}
