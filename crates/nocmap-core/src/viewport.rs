//! Pan/zoom transform for the floor-map layer.
//!
//! The map content is drawn under `translate(tx, ty) scale(zoom)` with the
//! transform origin at the container's top-left corner, so a content point
//! `p` lands on screen at `t + p * zoom`.
//!
//! Three gestures drive it:
//!
//! - **Wheel zoom** ([`ViewportTransform::zoom_at`]) keeps the content point
//!   under the cursor fixed on screen.
//! - **Drag pan** ([`PanGesture`]) offsets the translation by the pointer
//!   delta since the drag started.
//! - **Pinch** ([`PinchGesture`]) scales relative to the zoom at gesture
//!   start and keeps the content point under the initial finger midpoint
//!   fixed.
//!
//! Zoom is clamped to [`ZoomLimits`] on every update.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ── Point ────────────────────────────────────────────────────────────

/// A 2D point or vector in pixels (or terminal cells).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

// ── Limits ───────────────────────────────────────────────────────────

/// Inclusive zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    min: f64,
    max: f64,
}

impl ZoomLimits {
    /// `[0.5, 5.0]`
    pub const DEFAULT: Self = Self { min: 0.5, max: 5.0 };

    /// `[0.5, 3.0]`, the range older dashboards used.
    pub const LEGACY: Self = Self { min: 0.5, max: 3.0 };

    pub fn new(min: f64, max: f64) -> Result<Self, CoreError> {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min > max {
            return Err(CoreError::validation(format!(
                "zoom limits must satisfy 0 < min <= max (got {min}..{max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(self) -> f64 {
        self.min
    }

    pub fn max(self) -> f64 {
        self.max
    }

    pub fn clamp(self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ── Zoom direction ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Multiplicative step per wheel notch.
    pub fn factor(self) -> f64 {
        match self {
            Self::In => 1.1,
            Self::Out => 0.9,
        }
    }

    /// Wheel convention: negative delta (scroll up) zooms in.
    pub fn from_wheel_delta(delta_y: f64) -> Self {
        if delta_y < 0.0 { Self::In } else { Self::Out }
    }
}

// ── Transform ────────────────────────────────────────────────────────

/// Zoom + translation applied to the map content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    zoom: f64,
    translate: Point,
    limits: ZoomLimits,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::new(ZoomLimits::DEFAULT)
    }
}

impl ViewportTransform {
    /// Identity transform with the given limits.
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            zoom: limits.clamp(1.0),
            translate: Point::ORIGIN,
            limits,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn translate(&self) -> Point {
        self.translate
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Whether this is the identity transform.
    pub fn is_identity(&self) -> bool {
        (self.zoom - 1.0).abs() < f64::EPSILON && self.translate == Point::ORIGIN
    }

    /// Back to `zoom = 1, translate = (0, 0)`.
    pub fn reset(&mut self) {
        self.zoom = self.limits.clamp(1.0);
        self.translate = Point::ORIGIN;
    }

    /// Replace the limits, re-clamping the current zoom.
    pub fn set_limits(&mut self, limits: ZoomLimits) {
        self.limits = limits;
        self.zoom = limits.clamp(self.zoom);
    }

    /// Wheel zoom anchored at `anchor`, the pointer position relative to
    /// the content's bounding box (i.e. `pointer - translate`).
    ///
    /// `point = anchor / zoom`, `new_zoom = clamp(zoom * factor)`,
    /// `translate += anchor - point * new_zoom`.
    pub fn zoom_at(&mut self, anchor: Point, direction: ZoomDirection) {
        self.zoom_by(anchor, direction.factor());
    }

    /// Like [`zoom_at`](Self::zoom_at) with an arbitrary factor.
    pub fn zoom_by(&mut self, anchor: Point, factor: f64) {
        let point = anchor * (1.0 / self.zoom);
        let new_zoom = self.limits.clamp(self.zoom * factor);
        self.translate = self.translate + anchor - point * new_zoom;
        self.zoom = new_zoom;
    }

    /// Wheel zoom for a pointer given relative to the container.
    pub fn zoom_at_screen(&mut self, pointer: Point, direction: ZoomDirection) {
        self.zoom_at(pointer - self.translate, direction);
    }

    /// Offset the translation directly (keyboard panning).
    pub fn pan_by(&mut self, delta: Point) {
        self.translate = self.translate + delta;
    }

    /// Content → screen.
    pub fn apply(&self, content: Point) -> Point {
        self.translate + content * self.zoom
    }

    /// Screen → content.
    pub fn invert(&self, screen: Point) -> Point {
        (screen - self.translate) * (1.0 / self.zoom)
    }

    /// `translate(txpx, typx) scale(zoom)`.
    pub fn css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate.x, self.translate.y, self.zoom
        )
    }

    /// Snapshot the state for a drag starting at `pointer`.
    pub fn begin_pan(&self, pointer: Point) -> PanGesture {
        PanGesture {
            start_pointer: pointer,
            start_translate: self.translate,
        }
    }

    /// Snapshot the state for a two-finger pinch.
    pub fn begin_pinch(&self, first: Point, second: Point) -> PinchGesture {
        PinchGesture {
            initial_distance: first.distance(second),
            initial_zoom: self.zoom,
            initial_translate: self.translate,
            content_point: self.invert(first.midpoint(second)),
        }
    }
}

impl fmt::Display for ViewportTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0}% @ ({:.0}, {:.0})",
            self.zoom * 100.0,
            self.translate.x,
            self.translate.y
        )
    }
}

// ── Gestures ─────────────────────────────────────────────────────────

/// An in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    start_pointer: Point,
    start_translate: Point,
}

impl PanGesture {
    /// `translate = start_translate + (pointer - start_pointer)`.
    pub fn update(&self, transform: &mut ViewportTransform, pointer: Point) {
        transform.translate = self.start_translate + (pointer - self.start_pointer);
    }
}

/// An in-progress two-finger pinch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchGesture {
    initial_distance: f64,
    initial_zoom: f64,
    initial_translate: Point,
    /// Content point under the initial finger midpoint.
    content_point: Point,
}

impl PinchGesture {
    /// Rescale for the current finger distance.
    ///
    /// Does nothing while the initial distance is zero (both fingers on the
    /// same spot), since the scale ratio is undefined.
    pub fn update(&self, transform: &mut ViewportTransform, distance: f64) {
        if self.initial_distance <= 0.0 || !distance.is_finite() {
            return;
        }
        let new_zoom = transform
            .limits
            .clamp(self.initial_zoom * distance / self.initial_distance);
        transform.translate = self.initial_translate + self.content_point * self.initial_zoom
            - self.content_point * new_zoom;
        transform.zoom = new_zoom;
    }

    pub fn initial_distance(&self) -> f64 {
        self.initial_distance
    }
}

// ── Tests ────────────────────────────────────────────────────────────
