use crate::models::Category;
use crate::vendor::api::{
    OpName, OP_FETCH_BATTERY_OVERVIEW, OP_FETCH_FLIGHT_SNAPSHOT, OP_FETCH_PERCEPTION_OBSTACLE_DATA,
    OP_FETCH_POSITIONING_SNAPSHOT, OP_FETCH_VISION_ASSIST_STATUS, OP_GET_AIRCRAFT_BATTERY_STATE,
    OP_GET_FLIGHT_CONTROLLER_STATE, OP_GET_GPS_SIGNAL_STATUS, OP_GET_OBSTACLE_DATA,
    OP_GET_VISION_POSITIONING_INFO,
};
use crate::vendor::version::VendorApiVersion;

/// Associates one sensor category with the operation spellings that may
/// answer it, in preference order. Built once at startup from the
/// configured vendor version and read-only while polling. The category
/// doubles as the expected result shape: a candidate answering with a
/// different shape is rejected by the probe.
#[derive(Debug, Clone)]
pub struct ProviderBinding {
    pub category: Category,
    pub candidates: Vec<OpName>,
}

impl ProviderBinding {
    pub fn new(category: Category, candidates: Vec<OpName>) -> Self {
        ProviderBinding {
            category,
            candidates,
        }
    }
}

impl std::fmt::Display for ProviderBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.candidates.iter().map(|op| op.0).collect();
        write!(f, "({}: {})", self.category, names.join(" -> "))
    }
}

/// The full sweep configuration for one vendor release. On the older
/// release the legacy spelling leads and the newer one is the fallback;
/// from 5.11 on it is the other way around, because the vendor dropped
/// most legacy spellings there while keeping a deprecated battery alias.
pub fn profile(version: VendorApiVersion) -> Vec<ProviderBinding> {
    match version {
        VendorApiVersion::V5_8 => vec![
            ProviderBinding::new(
                Category::Vision,
                vec![OP_GET_VISION_POSITIONING_INFO, OP_FETCH_VISION_ASSIST_STATUS],
            ),
            ProviderBinding::new(
                Category::Obstacle,
                vec![OP_GET_OBSTACLE_DATA, OP_FETCH_PERCEPTION_OBSTACLE_DATA],
            ),
            ProviderBinding::new(
                Category::Gps,
                vec![OP_GET_GPS_SIGNAL_STATUS, OP_FETCH_POSITIONING_SNAPSHOT],
            ),
            ProviderBinding::new(
                Category::Battery,
                vec![OP_GET_AIRCRAFT_BATTERY_STATE, OP_FETCH_BATTERY_OVERVIEW],
            ),
            ProviderBinding::new(
                Category::Flight,
                vec![OP_GET_FLIGHT_CONTROLLER_STATE, OP_FETCH_FLIGHT_SNAPSHOT],
            ),
        ],
        VendorApiVersion::V5_11 => vec![
            ProviderBinding::new(
                Category::Vision,
                vec![OP_FETCH_VISION_ASSIST_STATUS, OP_GET_VISION_POSITIONING_INFO],
            ),
            ProviderBinding::new(
                Category::Obstacle,
                vec![OP_FETCH_PERCEPTION_OBSTACLE_DATA, OP_GET_OBSTACLE_DATA],
            ),
            ProviderBinding::new(
                Category::Gps,
                vec![OP_FETCH_POSITIONING_SNAPSHOT, OP_GET_GPS_SIGNAL_STATUS],
            ),
            ProviderBinding::new(
                Category::Battery,
                vec![OP_FETCH_BATTERY_OVERVIEW, OP_GET_AIRCRAFT_BATTERY_STATE],
            ),
            ProviderBinding::new(
                Category::Flight,
                vec![OP_FETCH_FLIGHT_SNAPSHOT, OP_GET_FLIGHT_CONTROLLER_STATE],
            ),
        ],
    }
}
