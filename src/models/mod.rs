mod battery;
mod flight;
mod gps;
mod obstacle;
mod reading;
mod vision;

pub use battery::*;
pub use flight::*;
pub use gps::*;
pub use obstacle::*;
pub use reading::*;
pub use vision::*;
