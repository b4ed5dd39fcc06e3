use serde::{Deserialize, Serialize};

use crate::models::reading::Availability;
use crate::vendor::api::{AvoidanceMode, VisionSample};

/// Vision-system reading: downward positioning assist plus the active
/// obstacle-avoidance behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionStatus {
    pub availability: Availability,
    pub status: String,
    pub positioning_enabled: Option<bool>,
    pub avoidance_mode: Option<AvoidanceMode>,
}

impl VisionStatus {
    pub fn offline(availability: Availability) -> Self {
        VisionStatus {
            status: availability.label(),
            availability,
            positioning_enabled: None,
            avoidance_mode: None,
        }
    }
}

impl From<&VisionSample> for VisionStatus {
    fn from(sample: &VisionSample) -> Self {
        let status = format!(
            "positioning {}, avoidance {}",
            if sample.positioning_enabled {
                "on"
            } else {
                "off"
            },
            sample.avoidance_mode,
        );
        VisionStatus {
            availability: Availability::Live,
            status,
            positioning_enabled: Some(sample.positioning_enabled),
            avoidance_mode: Some(sample.avoidance_mode),
        }
    }
}

impl std::fmt::Display for VisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(VisionStatus: {})", self.status)
    }
}
