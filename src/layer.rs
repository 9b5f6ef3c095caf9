use serde::Serialize;
use std::collections::HashMap;

use crate::constants::{DATA_ATTRIBUTION, TILE_ATTRIBUTION};
use crate::marker::Marker;
use crate::model::PanelId;
use crate::settings::Settings;
use crate::zoom::ZoomEffect;

/// Map state owned by the mapping collaborator: view, tiles and the root
/// container's `data-zoomlevel` attribute.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: (f64, f64),
    pub zoom: f64,
    pub tile_url: String,
    pub attributions: Vec<String>,
    pub zoom_attribute: String,
}

impl MapView {
    pub fn new(settings: &Settings) -> Self {
        Self {
            center: (settings.center_lat, settings.center_lon),
            zoom: settings.default_zoom,
            tile_url: settings.tile_url.clone(),
            attributions: vec![TILE_ATTRIBUTION.to_string(), DATA_ATTRIBUTION.to_string()],
            zoom_attribute: format_zoom(settings.default_zoom),
        }
    }
}

// Same text a browser gives for the number: 9 -> "9", 9.5 -> "9.5"
fn format_zoom(zoom: f64) -> String {
    format!("{}", zoom)
}

/// Batched icon layer. Markers are attached once; afterwards only their
/// icon sizes and the layer opacity change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarkerLayer {
    pub opacity: f64,
    markers: Vec<Marker>,
    #[serde(skip)]
    by_panel: HashMap<PanelId, usize>,
}

impl MarkerLayer {
    pub fn new(opacity: f64) -> Self {
        Self {
            opacity,
            ..Self::default()
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
    }

    pub fn add_layers(&mut self, markers: Vec<Marker>) {
        for marker in markers {
            self.by_panel.insert(marker.panel_id.clone(), self.markers.len());
            self.markers.push(marker);
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker_for(&self, id: &PanelId) -> Option<&Marker> {
        self.by_panel.get(id).map(|&i| &self.markers[i])
    }

    /// Hide one marker's container; returns false if the panel has no marker.
    pub fn hide_marker(&mut self, id: &PanelId) -> bool {
        match self.by_panel.get(id) {
            Some(&i) => {
                self.markers[i].hidden = true;
                true
            }
            None => false,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.markers.iter().filter(|m| !m.hidden).count()
    }
}

/// Push one zoom level into the layer, its markers and the map container.
pub fn set_icon_zoom_effect(effect: ZoomEffect, map: &mut MapView, layer: &mut MarkerLayer) {
    layer.set_opacity(effect.opacity);
    scale_markers(&mut layer.markers, effect.scale);

    // For use in CSS
    map.zoom = effect.zoom;
    map.zoom_attribute = format_zoom(effect.zoom);
}

pub fn scale_markers(markers: &mut [Marker], factor: f64) {
    for marker in markers.iter_mut() {
        marker.icon.apply_scale(factor);
    }
}
