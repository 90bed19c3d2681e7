//! The 14-field feature vector collected by the prediction form.
//!
//! Ranges here are advisory. The relay reports values outside them but
//! always forwards the payload unchanged.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub const FEATURE_COUNT: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldGroup {
    #[serde(rename = "Time Features")]
    Time,
    #[serde(rename = "Power Statistics")]
    PowerStatistics,
    #[serde(rename = "Historical Data")]
    Historical,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub group: FieldGroup,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: f64,
}

impl FieldSpec {
    const fn bounded(name: &'static str, label: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            label,
            group: FieldGroup::Time,
            min: Some(min),
            max: Some(max),
            step: 1.0,
        }
    }

    const fn reading(name: &'static str, label: &'static str, group: FieldGroup) -> Self {
        Self {
            name,
            label,
            group,
            min: None,
            max: None,
            step: 0.1,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Field order is the order the model was trained on.
pub static FIELDS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec::bounded("hour", "Hour (0-23)", 0.0, 23.0),
    FieldSpec::bounded("day_of_week", "Day of Week (0-6)", 0.0, 6.0),
    FieldSpec::bounded("day", "Day (1-31)", 1.0, 31.0),
    FieldSpec::bounded("month", "Month (1-12)", 1.0, 12.0),
    FieldSpec::bounded("is_weekend", "Is Weekend", 0.0, 1.0),
    FieldSpec::reading("max_power", "Max Power (kW)", FieldGroup::PowerStatistics),
    FieldSpec::reading("min_power", "Min Power (kW)", FieldGroup::PowerStatistics),
    FieldSpec::reading("std_power", "Std Power (kW)", FieldGroup::PowerStatistics),
    FieldSpec::reading("avg_voltage", "Avg Voltage (V)", FieldGroup::PowerStatistics),
    FieldSpec::reading("power_lag_1h", "Power Lag 1h (kW)", FieldGroup::Historical),
    FieldSpec::reading("power_lag_24h", "Power Lag 24h (kW)", FieldGroup::Historical),
    FieldSpec::reading("power_lag_168h", "Power Lag 168h (kW)", FieldGroup::Historical),
    FieldSpec::reading("power_rolling_mean_7d", "Rolling Mean 7d (kW)", FieldGroup::Historical),
    FieldSpec::reading("power_rolling_std_7d", "Rolling Std 7d (kW)", FieldGroup::Historical),
];

pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub hour: f64,
    pub day_of_week: f64,
    pub day: f64,
    pub month: f64,
    pub is_weekend: f64,
    pub max_power: f64,
    pub min_power: f64,
    pub std_power: f64,
    pub avg_voltage: f64,
    pub power_lag_1h: f64,
    pub power_lag_24h: f64,
    pub power_lag_168h: f64,
    pub power_rolling_mean_7d: f64,
    pub power_rolling_std_7d: f64,
}

/// Values the form starts with.
impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            hour: 14.0,
            day_of_week: 3.0,
            day: 15.0,
            month: 6.0,
            is_weekend: 0.0,
            max_power: 3.5,
            min_power: 1.2,
            std_power: 0.8,
            avg_voltage: 240.5,
            power_lag_1h: 2.1,
            power_lag_24h: 2.3,
            power_lag_168h: 2.0,
            power_rolling_mean_7d: 2.2,
            power_rolling_std_7d: 0.7,
        }
    }
}

impl FeatureVector {
    /// Builds a vector from raw form inputs, one string per field.
    /// Missing fields are 0; unknown names are logged and ignored.
    pub fn from_form(fields: &HashMap<String, String>) -> Self {
        let mut v = Self::zeroed();
        for (name, raw) in fields {
            if !v.set_from_input(name, raw) {
                warn!(field = %name, "ignoring unknown form field");
            }
        }
        v
    }

    pub fn zeroed() -> Self {
        Self {
            hour: 0.0,
            day_of_week: 0.0,
            day: 0.0,
            month: 0.0,
            is_weekend: 0.0,
            max_power: 0.0,
            min_power: 0.0,
            std_power: 0.0,
            avg_voltage: 0.0,
            power_lag_1h: 0.0,
            power_lag_24h: 0.0,
            power_lag_168h: 0.0,
            power_rolling_mean_7d: 0.0,
            power_rolling_std_7d: 0.0,
        }
    }

    /// Returns false for an unknown field name.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        match self.slot_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Applies raw form input using the same rule as the input widgets.
    pub fn set_from_input(&mut self, name: &str, raw: &str) -> bool {
        self.set(name, parse_input(raw))
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut f64> {
        let slot = match name {
            "hour" => &mut self.hour,
            "day_of_week" => &mut self.day_of_week,
            "day" => &mut self.day,
            "month" => &mut self.month,
            "is_weekend" => &mut self.is_weekend,
            "max_power" => &mut self.max_power,
            "min_power" => &mut self.min_power,
            "std_power" => &mut self.std_power,
            "avg_voltage" => &mut self.avg_voltage,
            "power_lag_1h" => &mut self.power_lag_1h,
            "power_lag_24h" => &mut self.power_lag_24h,
            "power_lag_168h" => &mut self.power_lag_168h,
            "power_rolling_mean_7d" => &mut self.power_rolling_mean_7d,
            "power_rolling_std_7d" => &mut self.power_rolling_std_7d,
            _ => return None,
        };
        Some(slot)
    }
}

/// Parses one form input the way the input widgets do: the longest numeric
/// prefix wins (`"12abc"` is 12, `"1,5"` is 1). No numeric prefix, or a
/// non-finite result, gives 0.
pub fn parse_input(raw: &str) -> f64 {
    let s = raw.trim_start();
    s.char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .rev()
        .find_map(|end| s[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// A non-blocking observation about a feature payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    NotAnObject,
    Missing(&'static str),
    NotNumeric(&'static str),
    OutOfRange { field: &'static FieldSpec, value: f64 },
    Unknown(String),
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::NotAnObject => write!(f, "payload is not a JSON object"),
            Advisory::Missing(name) => write!(f, "{name} is missing"),
            Advisory::NotNumeric(name) => write!(f, "{name} is not a number"),
            Advisory::OutOfRange { field, value } => {
                let min = field.min.map_or("-inf".to_string(), |v| v.to_string());
                let max = field.max.map_or("inf".to_string(), |v| v.to_string());
                write!(f, "{}={} is outside [{}, {}]", field.name, value, min, max)
            }
            Advisory::Unknown(name) => write!(f, "{name} is not a known feature"),
        }
    }
}

/// Checks an untyped payload against `FIELDS`.
pub fn inspect(data: &Value) -> Vec<Advisory> {
    let Some(map) = data.as_object() else {
        return vec![Advisory::NotAnObject];
    };

    let mut advisories = Vec::new();
    for spec in &FIELDS {
        match map.get(spec.name) {
            None => advisories.push(Advisory::Missing(spec.name)),
            Some(value) => match value.as_f64() {
                None => advisories.push(Advisory::NotNumeric(spec.name)),
                Some(v) if !spec.contains(v) => {
                    advisories.push(Advisory::OutOfRange { field: spec, value: v })
                }
                Some(_) => {}
            },
        }
    }

    for name in map.keys() {
        if field(name).is_none() {
            advisories.push(Advisory::Unknown(name.clone()));
        }
    }

    advisories
}

/// Served to form clients so they can render inputs and defaults.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureSchema {
    pub fields: &'static [FieldSpec],
    pub defaults: FeatureVector,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            fields: &FIELDS,
            defaults: FeatureVector::default(),
        }
    }
}
