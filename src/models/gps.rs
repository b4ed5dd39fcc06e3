use serde::{Deserialize, Serialize};

use crate::models::reading::Availability;
use crate::vendor::api::GpsSample;

/// Positioning reading as delivered to the listener. Covers the GPS
/// constellation view plus the RTK-style fix flag the aircraft reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsStatus {
    pub availability: Availability,
    pub status: String,
    pub satellites: Option<u16>,
    pub signal_level: Option<u8>,
    pub position_fixed: Option<bool>,
}

impl GpsStatus {
    pub fn offline(availability: Availability) -> Self {
        GpsStatus {
            status: availability.label(),
            availability,
            satellites: None,
            signal_level: None,
            position_fixed: None,
        }
    }
}

impl From<&GpsSample> for GpsStatus {
    fn from(sample: &GpsSample) -> Self {
        let status = format!(
            "{} sats, signal {}/5, {}",
            sample.satellites,
            sample.signal_level,
            if sample.position_fixed {
                "fixed"
            } else {
                "no fix"
            },
        );
        GpsStatus {
            availability: Availability::Live,
            status,
            satellites: Some(sample.satellites),
            signal_level: Some(sample.signal_level),
            position_fixed: Some(sample.position_fixed),
        }
    }
}

impl std::fmt::Display for GpsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(GpsStatus: {})", self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_conversion() {
        let sample = GpsSample {
            satellites: 18,
            signal_level: 5,
            position_fixed: true,
        };
        let status = GpsStatus::from(&sample);
        assert!(status.availability.is_live());
        assert_eq!(status.satellites, Some(18));
        assert_eq!(status.status, "18 sats, signal 5/5, fixed");
    }

    #[test]
    fn test_no_fix_text() {
        let sample = GpsSample {
            satellites: 4,
            signal_level: 1,
            position_fixed: false,
        };
        assert_eq!(GpsStatus::from(&sample).status, "4 sats, signal 1/5, no fix");
    }

    #[test]
    fn test_disconnected_offline() {
        let status = GpsStatus::offline(Availability::Disconnected);
        assert_eq!(status.satellites, None);
        assert_eq!(status.status, "disconnected");
    }
}
