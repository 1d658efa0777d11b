//! Gas arithmetic. Pure functions over integer gram weights.
//!
//! `remaining_gas` may go negative (a canister weighed below its nominal
//! tare); only the percentage is clamped.

use serde::Serialize;

/// Usable gas in a full canister: `full_weight - empty_weight`.
pub fn gas_capacity(full_weight: i32, empty_weight: i32) -> i32 {
    full_weight - empty_weight
}

/// Gas left given a measured gross weight. Not clamped.
pub fn remaining_gas(weight: i32, empty_weight: i32) -> i32 {
    weight - empty_weight
}

/// Remaining gas as a percentage of capacity, clamped to `[0, 100]`.
/// A non-positive capacity yields 0.
pub fn remaining_percentage(weight: i32, empty_weight: i32, gas_capacity: i32) -> f64 {
    if gas_capacity <= 0 {
        return 0.0;
    }
    let pct = f64::from(remaining_gas(weight, empty_weight)) / f64::from(gas_capacity) * 100.0;
    pct.clamp(0.0, 100.0)
}

pub fn consumption_percentage(remaining_percentage: f64) -> f64 {
    100.0 - remaining_percentage
}

/// Display bucket for a canister.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusClass {
    High,
    Medium,
    Low,
    None,
    Depleted,
}

/// Buckets a canister. Thresholds are strict: exactly 50 is medium, exactly 25 is low.
pub fn status_class(remaining_percentage: Option<f64>, is_depleted: bool) -> StatusClass {
    if is_depleted {
        return StatusClass::Depleted;
    }
    match remaining_percentage {
        None => StatusClass::None,
        Some(pct) if pct > 50.0 => StatusClass::High,
        Some(pct) if pct > 25.0 => StatusClass::Medium,
        Some(_) => StatusClass::Low,
    }
}

/// Inverse of [`remaining_percentage`]: the gross weight at which a canister
/// holds `percentage` of its capacity.
pub fn weight_at_percentage(percentage: f64, empty_weight: i32, gas_capacity: i32) -> f64 {
    f64::from(empty_weight) + percentage / 100.0 * f64::from(gas_capacity)
}

/// All derived values for one weighing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GasReading {
    pub remaining_gas: i32,
    pub remaining_percentage: f64,
    pub consumption_percentage: f64,
}

impl GasReading {
    pub fn new(weight: i32, empty_weight: i32, full_weight: i32) -> Self {
        let capacity = gas_capacity(full_weight, empty_weight);
        let remaining = remaining_percentage(weight, empty_weight, capacity);
        Self {
            remaining_gas: remaining_gas(weight, empty_weight),
            remaining_percentage: remaining,
            consumption_percentage: consumption_percentage(remaining),
        }
    }
}

/// One row of the printable cheat sheet, as fractions of capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub label: &'static str,
    pub top: f64,
    pub bottom: f64,
    pub class: StatusClass,
}

pub const CHEAT_SHEET_BANDS: [Band; 5] = [
    Band {
        label: "100-80%",
        top: 1.0,
        bottom: 0.8,
        class: StatusClass::High,
    },
    Band {
        label: "79-60%",
        top: 0.79,
        bottom: 0.6,
        class: StatusClass::Medium,
    },
    Band {
        label: "59-40%",
        top: 0.59,
        bottom: 0.4,
        class: StatusClass::Medium,
    },
    Band {
        label: "39-20%",
        top: 0.39,
        bottom: 0.2,
        class: StatusClass::Low,
    },
    Band {
        label: "19-0%",
        top: 0.19,
        bottom: 0.0,
        class: StatusClass::Low,
    },
];
