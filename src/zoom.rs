use crate::constants::{BASE_OPACITY, NATIVE_SIZE_ZOOM_LEVEL, OPACITY_ZOOM_DIVISOR};

/// Marker layer opacity for a zoom level. Unclamped: exceeds 1.0 past zoom 20.
pub fn opacity(zoom: f64) -> f64 {
    BASE_OPACITY + zoom / OPACITY_ZOOM_DIVISOR
}

/// Factor applied to an icon's original size; 1.0 at zoom 18.
pub fn icon_scale(zoom: f64) -> f64 {
    zoom / NATIVE_SIZE_ZOOM_LEVEL
}

/// Opacity as handed to the layer, optionally clamped to [0, 1].
pub fn layer_opacity(zoom: f64, clamp: bool) -> f64 {
    let value = opacity(zoom);
    if clamp {
        value.clamp(0.0, 1.0)
    } else {
        value
    }
}

/// Both visual parameters for one zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomEffect {
    pub zoom: f64,
    pub opacity: f64,
    pub scale: f64,
}

impl ZoomEffect {
    pub fn at(zoom: f64, clamp_opacity: bool) -> Self {
        Self {
            zoom,
            opacity: layer_opacity(zoom, clamp_opacity),
            scale: icon_scale(zoom),
        }
    }
}
