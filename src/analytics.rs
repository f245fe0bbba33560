use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{record::RunwayRecord, weather::WeatherRange, zones::ZoneId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainBand {
    Dry,
    Light,
    Heavy,
}

impl RainBand {
    pub fn of(rain_mm: f64) -> Self {
        if rain_mm <= 0.0 {
            RainBand::Dry
        } else if rain_mm <= 5.0 {
            RainBand::Light
        } else {
            RainBand::Heavy
        }
    }
}

/// Conjunction of optional criteria; an empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub zones: BTreeSet<ZoneId>,
    pub aircraft: BTreeSet<String>,
    pub from: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
    pub temperature_c: Option<WeatherRange>,
    pub humidity_pct: Option<WeatherRange>,
    /// Any-of semantics across the selected bands.
    pub rain: BTreeSet<RainBand>,
}

impl RecordFilter {
    pub fn matches(&self, record: &RunwayRecord) -> bool {
        (self.zones.is_empty() || self.zones.contains(&record.zone))
            && (self.aircraft.is_empty() || self.aircraft.contains(&record.aircraft))
            && self.from.map_or(true, |from| record.timestamp >= from)
            && self.until.map_or(true, |until| record.timestamp <= until)
            && self
                .temperature_c
                .map_or(true, |range| range.contains(record.temperature_c))
            && self
                .humidity_pct
                .map_or(true, |range| range.contains(record.humidity_pct))
            && (self.rain.is_empty() || self.rain.contains(&RainBand::of(record.rain_mm)))
    }

    pub fn apply<'a>(&self, records: &'a [RunwayRecord]) -> Vec<&'a RunwayRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub zone: ZoneId,
    pub records: usize,
    pub mean_stress: f64,
    pub mean_fod_weight_g: f64,
    pub mean_rubber_mm: f64,
    pub mean_cracks_mm: f64,
    pub max_water_mm: f64,
    pub anomalies: usize,
}

#[derive(Default)]
struct ZoneAccumulator {
    records: usize,
    stress: f64,
    fod: f64,
    rubber: f64,
    cracks: f64,
    max_water: f64,
    anomalies: usize,
}

pub fn zone_summaries<'a>(records: impl IntoIterator<Item = &'a RunwayRecord>) -> Vec<ZoneSummary> {
    let mut zones: BTreeMap<ZoneId, ZoneAccumulator> = BTreeMap::new();
    for record in records {
        let acc = zones.entry(record.zone).or_default();
        acc.records += 1;
        acc.stress += record.stress;
        acc.fod += record.fod_weight_g;
        acc.rubber += record.rubber_mm;
        acc.cracks += record.cracks_mm;
        acc.max_water = acc.max_water.max(record.water_mm);
        acc.anomalies += usize::from(record.anomaly);
    }
    zones
        .into_iter()
        .map(|(zone, acc)| {
            let n = acc.records as f64;
            ZoneSummary {
                zone,
                records: acc.records,
                mean_stress: acc.stress / n,
                mean_fod_weight_g: acc.fod / n,
                mean_rubber_mm: acc.rubber / n,
                mean_cracks_mm: acc.cracks / n,
                max_water_mm: acc.max_water,
                anomalies: acc.anomalies,
            }
        })
        .collect()
}

/// Mean stress per aircraft type, highest first.
pub fn aircraft_stress<'a>(
    records: impl IntoIterator<Item = &'a RunwayRecord>,
) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(record.aircraft.as_str()).or_default();
        entry.0 += record.stress;
        entry.1 += 1;
    }
    let mut means: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(code, (sum, count))| (code.to_string(), sum / count as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub records: usize,
    pub anomalies: usize,
    pub mean_stress: Option<f64>,
    pub zones: usize,
}

pub fn overview<'a>(records: impl IntoIterator<Item = &'a RunwayRecord>) -> Overview {
    let mut count = 0usize;
    let mut anomalies = 0usize;
    let mut stress = 0.0;
    let mut zones = BTreeSet::new();
    for record in records {
        count += 1;
        anomalies += usize::from(record.anomaly);
        stress += record.stress;
        zones.insert(record.zone);
    }
    Overview {
        records: count,
        anomalies,
        mean_stress: (count > 0).then(|| stress / count as f64),
        zones: zones.len(),
    }
}
