use serde::Serialize;
use std::path::Path;

use crate::assets::{image_for_panel, probe_image};
use crate::model::{Panel, PanelId};
use crate::registry::PanelRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn centre(&self) -> Point {
        Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }

    pub fn scaled(&self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Icon options for one marker. `original_size` never changes after
/// creation; `size` and `anchor` are rewritten on every zoom change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Icon {
    pub url: String,
    pub original_size: Size,
    pub size: Size,
    pub anchor: Point,
}

impl Icon {
    pub fn centred(url: String, width: u32, height: u32) -> Self {
        let size = Size::new(f64::from(width), f64::from(height));
        Self {
            url,
            original_size: size,
            size,
            anchor: size.centre(),
        }
    }

    /// Rescale from the original size, so repeated calls never drift.
    pub fn apply_scale(&mut self, factor: f64) {
        self.size = self.original_size.scaled(factor);
        self.anchor = self.size.centre();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub panel_id: PanelId,
    pub lat: f64,
    pub lon: f64,
    pub icon: Icon,
    /// Container hidden because the icon image could not be loaded
    pub hidden: bool,
}

impl Marker {
    /// Marker for a panel, or `None` when its coordinates or image size are unusable.
    pub fn for_panel(panel: &Panel) -> Option<Self> {
        let (lat, lon) = panel.coordinates()?;
        let (width, height) = panel.image_size()?;

        Some(Self {
            panel_id: panel.id.clone(),
            lat,
            lon,
            icon: Icon::centred(image_for_panel(&panel.id), width, height),
            hidden: false,
        })
    }
}

#[derive(Debug, Default)]
pub struct MarkerBatch {
    pub markers: Vec<Marker>,
    pub skipped: usize,
}

/// Build one marker per renderable panel, in registry order. Records with bad
/// coordinates or image sizes are dropped silently. When `probe_dir` is set,
/// markers whose image file is missing start out hidden.
pub fn build_markers(registry: &PanelRegistry, probe_dir: Option<&Path>) -> MarkerBatch {
    let mut batch = MarkerBatch::default();

    for panel in registry.iter() {
        let Some(mut marker) = Marker::for_panel(panel) else {
            tracing::debug!("Skipping panel {}: no usable position or image size", panel.id);
            batch.skipped += 1;
            continue;
        };

        if let Some(dir) = probe_dir {
            marker.hidden = probe_image(dir, &panel.id).is_missing();
        }

        batch.markers.push(marker);
    }

    batch
}
