//! The emitted unit of the simulator and its tabular encoding.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::weather::Wind;
use crate::zones::ZoneId;

/// Canonical column order shared with downstream tables.
pub const COLUMNS: [&str; 13] = [
    "timestamp",
    "flight_id",
    "aircraft",
    "zone",
    "rubber_mm",
    "cracks_mm",
    "water_mm",
    "stress",
    "fod_weight_g",
    "temperature_C",
    "humidity_pct",
    "rain_mm",
    "anomaly",
];

/// Trailing columns present only when the run sampled wind.
pub const WIND_COLUMNS: [&str; 2] = ["wind_speed_mps", "wind_direction_deg"];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Rounds half away from zero to two decimals, the wire precision of a record.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayRecord {
    pub timestamp: NaiveDateTime,
    pub flight_id: String,
    pub aircraft: String,
    pub zone: ZoneId,
    pub rubber_mm: f64,
    pub cracks_mm: f64,
    pub water_mm: f64,
    pub stress: f64,
    pub fod_weight_g: f64,
    #[serde(rename = "temperature_C")]
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub rain_mm: f64,
    #[serde(with = "anomaly_flag")]
    pub anomaly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_mps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction_deg: Option<f64>,
}

impl RunwayRecord {
    pub fn wind(&self) -> Option<Wind> {
        match (self.wind_speed_mps, self.wind_direction_deg) {
            (Some(speed_mps), Some(direction_deg)) => Some(Wind {
                speed_mps,
                direction_deg,
            }),
            _ => None,
        }
    }

    pub fn has_wind(&self) -> bool {
        self.wind().is_some()
    }

    pub fn to_csv_row(&self, with_wind: bool) -> String {
        let mut fields = vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            quote(&self.flight_id),
            quote(&self.aircraft),
            self.zone.to_string(),
            self.rubber_mm.to_string(),
            self.cracks_mm.to_string(),
            self.water_mm.to_string(),
            self.stress.to_string(),
            self.fod_weight_g.to_string(),
            self.temperature_c.to_string(),
            self.humidity_pct.to_string(),
            self.rain_mm.to_string(),
            u8::from(self.anomaly).to_string(),
        ];
        if with_wind {
            fields.push(optional(self.wind_speed_mps));
            fields.push(optional(self.wind_direction_deg));
        }
        fields.join(",")
    }

    /// Parses one data row; `line` is only used in error messages.
    pub fn from_csv_row(row: &str, with_wind: bool, line: usize) -> Result<Self, RecordError> {
        let fields = split_row(row);
        let expected = COLUMNS.len() + if with_wind { WIND_COLUMNS.len() } else { 0 };
        if fields.len() != expected {
            return Err(RecordError::Column {
                line,
                expected,
                found: fields.len(),
            });
        }

        let timestamp = NaiveDateTime::parse_from_str(&fields[0], TIMESTAMP_FORMAT)
            .map_err(|_| field_error(line, 0, &fields[0]))?;
        let float = |index: usize| -> Result<f64, RecordError> {
            fields[index]
                .trim()
                .parse::<f64>()
                .map_err(|_| field_error(line, index, &fields[index]))
        };
        let zone = fields[3]
            .trim()
            .parse::<ZoneId>()
            .map_err(|_| field_error(line, 3, &fields[3]))?;
        let anomaly = match fields[12].trim() {
            "0" => false,
            "1" => true,
            _ => return Err(field_error(line, 12, &fields[12])),
        };
        let (wind_speed_mps, wind_direction_deg) = if with_wind {
            (optional_float(&fields, 13, line)?, optional_float(&fields, 14, line)?)
        } else {
            (None, None)
        };

        Ok(Self {
            timestamp,
            flight_id: fields[1].clone(),
            aircraft: fields[2].clone(),
            zone,
            rubber_mm: float(4)?,
            cracks_mm: float(5)?,
            water_mm: float(6)?,
            stress: float(7)?,
            fod_weight_g: float(8)?,
            temperature_c: float(9)?,
            humidity_pct: float(10)?,
            rain_mm: float(11)?,
            anomaly,
            wind_speed_mps,
            wind_direction_deg,
        })
    }
}

fn column_name(index: usize) -> &'static str {
    COLUMNS
        .iter()
        .chain(WIND_COLUMNS.iter())
        .nth(index)
        .copied()
        .unwrap_or("unknown")
}

fn field_error(line: usize, index: usize, value: &str) -> RecordError {
    RecordError::Field {
        line,
        column: column_name(index),
        value: value.to_string(),
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn optional_float(fields: &[String], index: usize, line: usize) -> Result<Option<f64>, RecordError> {
    let raw = fields[index].trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| field_error(line, index, raw))
}

fn quote(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn split_row(row: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = row.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', _) => quoted = !quoted,
            (',', false) => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

mod anomaly_flag {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*flag))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(D::Error::custom(format!("anomaly must be 0 or 1, got {other}"))),
        }
    }
}
