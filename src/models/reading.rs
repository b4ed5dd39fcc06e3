use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::models::{
    battery::BatteryStatus, flight::FlightSummary, gps::GpsStatus, obstacle::ObstacleSummary,
    vision::VisionStatus,
};
use crate::vendor::api::ProviderValue;

/// Logical sensor categories covered by one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Category {
    #[display(fmt = "vision")]
    Vision,
    #[display(fmt = "obstacle")]
    Obstacle,
    #[display(fmt = "gps")]
    Gps,
    #[display(fmt = "battery")]
    Battery,
    #[display(fmt = "flight")]
    Flight,
}

impl Category {
    /// Every category in sweep order.
    pub const ALL: [Category; 5] = [
        Category::Vision,
        Category::Obstacle,
        Category::Gps,
        Category::Battery,
        Category::Flight,
    ];
}

/// Whether a reading carries live data, and if not, why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// Fresh data from the provider.
    Live,
    /// No active device at sweep start; no provider was called.
    Disconnected,
    /// Every candidate operation was exhausted without an answer.
    Unavailable,
    /// An operation was located and invoked but the vendor runtime
    /// raised; the message is retained for diagnostics.
    Error(String),
}

impl Availability {
    pub fn is_live(&self) -> bool {
        matches!(self, Availability::Live)
    }

    /// Placeholder status text for readings that carry no data.
    pub fn label(&self) -> String {
        match self {
            Availability::Live => "live".to_string(),
            Availability::Disconnected => "disconnected".to_string(),
            Availability::Unavailable => "unavailable".to_string(),
            Availability::Error(message) => format!("error: {}", message),
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One delivered result for one category. Produced fresh each tick,
/// immutable once constructed, discarded after delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SensorReading {
    Vision(VisionStatus),
    Obstacle(ObstacleSummary),
    Gps(GpsStatus),
    Battery(BatteryStatus),
    Flight(FlightSummary),
}

impl SensorReading {
    /// Build the no-data reading for a category.
    pub fn offline(category: Category, availability: Availability) -> Self {
        match category {
            Category::Vision => SensorReading::Vision(VisionStatus::offline(availability)),
            Category::Obstacle => SensorReading::Obstacle(ObstacleSummary::offline(availability)),
            Category::Gps => SensorReading::Gps(GpsStatus::offline(availability)),
            Category::Battery => SensorReading::Battery(BatteryStatus::offline(availability)),
            Category::Flight => SensorReading::Flight(FlightSummary::offline(availability)),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            SensorReading::Vision(_) => Category::Vision,
            SensorReading::Obstacle(_) => Category::Obstacle,
            SensorReading::Gps(_) => Category::Gps,
            SensorReading::Battery(_) => Category::Battery,
            SensorReading::Flight(_) => Category::Flight,
        }
    }

    pub fn availability(&self) -> &Availability {
        match self {
            SensorReading::Vision(status) => &status.availability,
            SensorReading::Obstacle(status) => &status.availability,
            SensorReading::Gps(status) => &status.availability,
            SensorReading::Battery(status) => &status.availability,
            SensorReading::Flight(status) => &status.availability,
        }
    }

    pub fn status(&self) -> &str {
        match self {
            SensorReading::Vision(status) => &status.status,
            SensorReading::Obstacle(status) => &status.status,
            SensorReading::Gps(status) => &status.status,
            SensorReading::Battery(status) => &status.status,
            SensorReading::Flight(status) => &status.status,
        }
    }
}

impl From<ProviderValue> for SensorReading {
    fn from(value: ProviderValue) -> Self {
        match value {
            ProviderValue::Vision(sample) => SensorReading::Vision(VisionStatus::from(&sample)),
            ProviderValue::Obstacle(sample) => {
                SensorReading::Obstacle(ObstacleSummary::from(&sample))
            }
            ProviderValue::Gps(sample) => SensorReading::Gps(GpsStatus::from(&sample)),
            ProviderValue::Battery(sample) => SensorReading::Battery(BatteryStatus::from(&sample)),
            ProviderValue::Flight(sample) => SensorReading::Flight(FlightSummary::from(&sample)),
        }
    }
}

impl std::fmt::Display for SensorReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.category(), self.status())
    }
}
