use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::models::reading::Availability;
use crate::vendor::api::BatterySample;

/// Coarse charge band derived from the reported percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ChargeLevel {
    #[display(fmt = "CRITICAL")]
    Critical,
    #[display(fmt = "LOW")]
    Low,
    #[display(fmt = "MEDIUM")]
    Medium,
    #[display(fmt = "GOOD")]
    Good,
}

impl ChargeLevel {
    /// Fixed mapping: 0-10 critical, 11-20 low, 21-30 medium, above good.
    pub fn for_percent(percent: u8) -> Self {
        match percent {
            0..=10 => ChargeLevel::Critical,
            11..=20 => ChargeLevel::Low,
            21..=30 => ChargeLevel::Medium,
            _ => ChargeLevel::Good,
        }
    }
}

/// Battery reading as delivered to the listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryStatus {
    pub availability: Availability,
    pub status: String,
    pub percent: Option<u8>,
    pub voltage: Option<f32>,
    pub charging: Option<bool>,
    pub level: Option<ChargeLevel>,
}

impl BatteryStatus {
    pub fn offline(availability: Availability) -> Self {
        BatteryStatus {
            status: availability.label(),
            availability,
            percent: None,
            voltage: None,
            charging: None,
            level: None,
        }
    }
}

impl From<&BatterySample> for BatteryStatus {
    fn from(sample: &BatterySample) -> Self {
        let level = ChargeLevel::for_percent(sample.percent);
        let status = format!(
            "{} {}% {:.1} V{}",
            level,
            sample.percent,
            sample.voltage,
            if sample.charging { ", charging" } else { "" },
        );
        BatteryStatus {
            availability: Availability::Live,
            status,
            percent: Some(sample.percent),
            voltage: Some(sample.voltage),
            charging: Some(sample.charging),
            level: Some(level),
        }
    }
}

impl std::fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(BatteryStatus: {})", self.status)
    }
}
