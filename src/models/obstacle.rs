use serde::{Deserialize, Serialize};

use crate::models::reading::Availability;
use crate::vendor::api::ObstacleSample;

/// Obstacle reading: per-sector clearances in metres plus the nearest
/// obstacle across all sectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSummary {
    pub availability: Availability,
    pub status: String,
    pub front_m: Option<f32>,
    pub rear_m: Option<f32>,
    pub left_m: Option<f32>,
    pub right_m: Option<f32>,
    pub nearest_m: Option<f32>,
}

impl ObstacleSummary {
    pub fn offline(availability: Availability) -> Self {
        ObstacleSummary {
            status: availability.label(),
            availability,
            front_m: None,
            rear_m: None,
            left_m: None,
            right_m: None,
            nearest_m: None,
        }
    }
}

impl From<&ObstacleSample> for ObstacleSummary {
    fn from(sample: &ObstacleSample) -> Self {
        // Sectors with nothing in range report a non-finite distance.
        let nearest = [sample.front_m, sample.rear_m, sample.left_m, sample.right_m]
            .into_iter()
            .filter(|distance| distance.is_finite())
            .fold(f32::INFINITY, f32::min);
        let (nearest_m, status) = if nearest.is_finite() {
            (Some(nearest), format!("nearest {:.1} m", nearest))
        } else {
            (None, "all sectors clear".to_string())
        };
        ObstacleSummary {
            availability: Availability::Live,
            status,
            front_m: Some(sample.front_m),
            rear_m: Some(sample.rear_m),
            left_m: Some(sample.left_m),
            right_m: Some(sample.right_m),
            nearest_m,
        }
    }
}

impl std::fmt::Display for ObstacleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(ObstacleSummary: {})", self.status)
    }
}
