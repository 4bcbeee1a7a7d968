pub mod overlay;
pub mod status_indicator;
