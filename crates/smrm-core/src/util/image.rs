//! Image compression presets and resize geometry.

use crate::models::{CompressionProfile, ImagePreset};

/// Resolve a preset name; unknown or missing names fall back to `standard`.
pub fn resolve_image_preset(preset: Option<&str>) -> CompressionProfile {
    preset
        .and_then(|name| name.parse::<ImagePreset>().ok())
        .unwrap_or_default()
        .profile()
}

/// Target size for fitting `width x height` within `max_side` on its longer edge.
///
/// Images already within bounds keep their size; square images scale by height.
pub fn scaled_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    if width <= max_side && height <= max_side {
        return (width, height);
    }
    if width > height {
        let scaled = (height as f64 * max_side as f64 / width as f64).round() as u32;
        (max_side, scaled)
    } else {
        let scaled = (width as f64 * max_side as f64 / height as f64).round() as u32;
        (scaled, max_side)
    }
}
