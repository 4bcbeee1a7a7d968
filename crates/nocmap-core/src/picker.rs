// ── Map picker ──
//
// Converts a click on a floor image into the percentage position stored
// with a device.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// A picked position, each axis in `[0, 100]` with two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PickedPosition {
    pub top: f64,
    pub left: f64,
}

impl PickedPosition {
    /// `top` as the admin form shows it, e.g. `"25.00"`.
    pub fn top_display(&self) -> String {
        format!("{:.2}", self.top)
    }

    pub fn left_display(&self) -> String {
        format!("{:.2}", self.left)
    }
}

impl fmt::Display for PickedPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "top {:.2}%, left {:.2}%", self.top, self.left)
    }
}

fn to_percent(offset: f64, extent: f64) -> f64 {
    let pct = (offset / extent * 100.0).clamp(0.0, 100.0);
    (pct * 100.0).round() / 100.0
}

/// Click at `(click_x, click_y)` on an image rendered at `width × height`.
pub fn pick(click_x: f64, click_y: f64, width: f64, height: f64) -> Result<PickedPosition, CoreError> {
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Err(CoreError::validation(format!(
            "image size must be positive (got {width}x{height})"
        )));
    }
    if !(click_x.is_finite() && click_y.is_finite()) {
        return Err(CoreError::validation("click position must be finite"));
    }
    Ok(PickedPosition {
        top: to_percent(click_y, height),
        left: to_percent(click_x, width),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn click_on_quarter_point() {
        let picked = pick(50.0, 25.0, 200.0, 100.0).unwrap();
        assert_eq!(picked.left_display(), "25.00");
        assert_eq!(picked.top_display(), "25.00");
    }

    #[test]
    fn rounds_to_two_decimals() {
        let picked = pick(1.0, 2.0, 3.0, 3.0).unwrap();
        assert_eq!(picked.left_display(), "33.33");
        assert_eq!(picked.top_display(), "66.67");
    }

    #[test]
    fn clamps_outside_clicks() {
        let picked = pick(-10.0, 500.0, 200.0, 100.0).unwrap();
        assert_eq!(picked.left_display(), "0.00");
        assert_eq!(picked.top_display(), "100.00");
    }

    #[test]
    fn rejects_empty_image() {
        assert!(matches!(
            pick(1.0, 1.0, 0.0, 100.0),
            Err(CoreError::ValidationFailed { .. })
        ));
        assert!(pick(1.0, 1.0, 100.0, -1.0).is_err());
        assert!(pick(f64::NAN, 1.0, 100.0, 100.0).is_err());
    }
}
