//! Tunable constants of the editing engine.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Editor configuration.
///
/// Every field has a default; a partial JSON object fills in the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// A new sample is kept only if it is farther than this from the previous one.
    pub sampling_threshold: f64,
    /// Erase radius as a multiple of the eraser width.
    pub eraser_radius_factor: f64,
    /// Offset applied to pasted entities.
    pub paste_offset: Vec2,
    /// Marquees narrower and shorter than this select nothing.
    pub min_marquee_size: f64,
    /// Vertical gap between stacked pages.
    pub page_gap: f64,
    /// Space above the first page.
    pub page_top_padding: f64,
    /// Horizontal page margin as a fraction of the viewport width.
    pub page_margin_ratio: f64,
    /// Fraction of the viewport width a page occupies at fit zoom.
    pub fit_ratio: f64,
    /// Multiplier for one zoom step.
    pub zoom_step: f64,
    pub canvas_min_zoom: f64,
    pub canvas_max_zoom: f64,
    /// Absolute lower bound on paged zoom.
    pub paged_zoom_floor: f64,
    /// Paged zoom range as multiples of fit zoom.
    pub paged_min_fit_multiplier: f64,
    pub paged_max_fit_multiplier: f64,
    /// Maximum undo depth; `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            sampling_threshold: 1.0,
            eraser_radius_factor: 2.0,
            paste_offset: Vec2::new(20.0, 20.0),
            min_marquee_size: 5.0,
            page_gap: 20.0,
            page_top_padding: 30.0,
            page_margin_ratio: 0.1,
            fit_ratio: 0.8,
            zoom_step: 1.2,
            canvas_min_zoom: 0.1,
            canvas_max_zoom: 10.0,
            paged_zoom_floor: 0.3,
            paged_min_fit_multiplier: 0.5,
            paged_max_fit_multiplier: 3.0,
            history_limit: None,
        }
    }
}

impl EditorConfig {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Radius around the pointer that an eraser of `width` affects.
    pub fn eraser_radius(&self, width: f64) -> f64 {
        width * self.eraser_radius_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{"zoom_step": 1.5, "history_limit": 50}"#).unwrap();
        assert!((config.zoom_step - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.history_limit, Some(50));
        assert!((config.page_gap - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.paste_offset, Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EditorConfig::default();
        let back = EditorConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_eraser_radius() {
        let config = EditorConfig::default();
        assert!((config.eraser_radius(10.0) - 20.0).abs() < f64::EPSILON);
    }
}
