//! Operator-facing severity grading with adjustable thresholds.
//!
//! Independent from the engine's fixed anomaly flag: a record can be graded
//! `High` without being an anomaly and the other way round.

use std::collections::BTreeMap;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::{engine::Thresholds, record::RunwayRecord, zones::ZoneId};

/// Thresholds an operator can tune at review time.
pub type AlertThresholds = Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Normal,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Normal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Normal => "Normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertReason {
    HighStress,
    LowRubber,
    HighCracks,
    WaterAccumulation,
    HighFod,
}

impl AlertReason {
    pub fn label(self) -> &'static str {
        match self {
            AlertReason::HighStress => "High Stress",
            AlertReason::LowRubber => "Low Rubber",
            AlertReason::HighCracks => "High Cracks",
            AlertReason::WaterAccumulation => "Water Accumulation",
            AlertReason::HighFod => "High FOD",
        }
    }
}

pub fn classify(record: &RunwayRecord, t: &AlertThresholds) -> Severity {
    let critical = record.stress >= t.stress * 1.5
        || record.fod_weight_g >= t.fod_weight_g * 3.0
        || (record.rubber_mm <= t.rubber_mm * 0.2 && record.cracks_mm >= t.cracks_mm * 2.0);
    if critical {
        return Severity::Critical;
    }
    if !reasons(record, t).is_empty() {
        return Severity::High;
    }
    let warning = record.stress >= t.stress * 0.6
        || record.rubber_mm <= t.rubber_mm * 1.5
        || record.fod_weight_g >= t.fod_weight_g * 0.5;
    if warning {
        Severity::Medium
    } else {
        Severity::Normal
    }
}

/// Every plain threshold the record meets, in display order.
pub fn reasons(record: &RunwayRecord, t: &AlertThresholds) -> Vec<AlertReason> {
    [
        (record.stress >= t.stress, AlertReason::HighStress),
        (record.rubber_mm <= t.rubber_mm, AlertReason::LowRubber),
        (record.cracks_mm >= t.cracks_mm, AlertReason::HighCracks),
        (record.water_mm >= t.water_mm, AlertReason::WaterAccumulation),
        (record.fod_weight_g >= t.fod_weight_g, AlertReason::HighFod),
    ]
    .into_iter()
    .filter_map(|(hit, reason)| hit.then_some(reason))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdAlert<'a> {
    pub record: &'a RunwayRecord,
    pub severity: Severity,
    pub reasons: Vec<AlertReason>,
}

pub fn threshold_alerts<'a>(
    records: &'a [RunwayRecord],
    t: &AlertThresholds,
) -> Vec<ThresholdAlert<'a>> {
    records
        .iter()
        .filter_map(|record| {
            let severity = classify(record, t);
            (severity != Severity::Normal).then(|| ThresholdAlert {
                record,
                severity,
                reasons: reasons(record, t),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSummary {
    pub total_records: usize,
    pub anomalies: usize,
    pub threshold_alerts: usize,
    /// Records that are an anomaly, a threshold alert, or both.
    pub combined_alerts: usize,
    pub top_zone: Option<ZoneId>,
    pub severity_counts: BTreeMap<Severity, usize>,
    /// Threshold alerts per zone, most alerts first.
    pub zone_counts: Vec<(ZoneId, usize)>,
    /// Anomalies or threshold alerts per hour of day.
    pub hourly: [usize; 24],
}

impl AlertSummary {
    pub fn build(records: &[RunwayRecord], t: &AlertThresholds) -> Self {
        let mut severity_counts: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        let mut per_zone: BTreeMap<ZoneId, usize> = BTreeMap::new();
        let mut hourly = [0usize; 24];
        let mut anomalies = 0;
        let mut threshold_alerts = 0;
        let mut combined_alerts = 0;

        for record in records {
            let severity = classify(record, t);
            *severity_counts.entry(severity).or_default() += 1;
            let alerted = severity != Severity::Normal;
            if alerted {
                threshold_alerts += 1;
                *per_zone.entry(record.zone).or_default() += 1;
            }
            if record.anomaly {
                anomalies += 1;
            }
            if alerted || record.anomaly {
                combined_alerts += 1;
                hourly[record.timestamp.hour() as usize] += 1;
            }
        }

        let mut zone_counts: Vec<_> = per_zone.into_iter().collect();
        // stable sort keeps ties in ascending zone order
        zone_counts.sort_by(|a, b| b.1.cmp(&a.1));
        let top_zone = zone_counts.first().map(|(zone, _)| *zone);

        Self {
            total_records: records.len(),
            anomalies,
            threshold_alerts,
            combined_alerts,
            top_zone,
            severity_counts,
            zone_counts,
            hourly,
        }
    }
}
