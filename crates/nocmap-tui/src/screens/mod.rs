//! Screen implementations. Each screen is a top-level Component.

pub mod devices;
pub mod log;
pub mod map;
pub mod tv;

use nocmap_core::ZoomLimits;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components for the tab bar.
pub fn create_screens(
    limits: ZoomLimits,
    preferred_floor: Option<String>,
) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Map,
            Box::new(map::MapScreen::new(limits, preferred_floor)),
        ),
        (ScreenId::Tv, Box::new(tv::TvScreen::new())),
        (ScreenId::Devices, Box::new(devices::DevicesScreen::new())),
        (ScreenId::Log, Box::new(log::LogScreen::new())),
    ]
}
