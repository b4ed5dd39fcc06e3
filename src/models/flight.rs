use serde::{Deserialize, Serialize};

use crate::models::reading::Availability;
use crate::vendor::api::{FlightMode, FlightSample};

/// Flight-controller reading: mode, height above takeoff and motor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub availability: Availability,
    pub status: String,
    pub mode: Option<FlightMode>,
    pub altitude_m: Option<f32>,
    pub motors_on: Option<bool>,
}

impl FlightSummary {
    pub fn offline(availability: Availability) -> Self {
        FlightSummary {
            status: availability.label(),
            availability,
            mode: None,
            altitude_m: None,
            motors_on: None,
        }
    }
}

impl From<&FlightSample> for FlightSummary {
    fn from(sample: &FlightSample) -> Self {
        let status = format!(
            "{}, alt {:.1} m, motors {}",
            sample.mode,
            sample.altitude_m,
            if sample.motors_on { "on" } else { "off" },
        );
        FlightSummary {
            availability: Availability::Live,
            status,
            mode: Some(sample.mode),
            altitude_m: Some(sample.altitude_m),
            motors_on: Some(sample.motors_on),
        }
    }
}

impl std::fmt::Display for FlightSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(FlightSummary: {})", self.status)
    }
}
